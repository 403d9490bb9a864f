//! Structured error details for gRPC responses.
//!
//! Encodes [`proto::ErrorDetails`] into `Status::details` bytes so clients
//! can read the error code, retryability and recovery guidance without
//! string matching. Clients that ignore `details` still see the
//! human-readable `Status.message`.

use std::collections::HashMap;

use cryptovote_proto::proto;
use cryptovote_types::ErrorCode;
use prost::Message;
use tonic::Status;

/// Build an [`ErrorDetails`](proto::ErrorDetails) message for `code`.
pub(crate) fn build_error_details(
    code: ErrorCode,
    context: HashMap<String, String>,
) -> proto::ErrorDetails {
    proto::ErrorDetails {
        error_code: code.as_u16().to_string(),
        is_retryable: code.is_retryable(),
        retry_after_ms: None,
        context,
        suggested_action: Some(code.suggested_action().to_owned()),
    }
}

/// Builds a `Status` whose details carry the encoded `ErrorDetails`.
pub(crate) fn status_with_details(
    grpc_code: tonic::Code,
    message: impl Into<String>,
    code: ErrorCode,
    context: HashMap<String, String>,
) -> Status {
    let encoded = build_error_details(code, context).encode_to_vec();
    Status::with_details(grpc_code, message, encoded.into())
}
