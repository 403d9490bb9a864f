//! Error types for the crypto service using snafu.
//!
//! [`ServiceError`] is what handlers produce; it is converted into a
//! `tonic::Status` at the service boundary, carrying an encoded
//! `crypto.v1.ErrorDetails` so clients can branch on a numeric code instead
//! of the message text.

// Snafu generates struct fields for context selectors that don't need documentation
#![allow(missing_docs)]

use std::collections::HashMap;

use cryptovote_store::StoreError;
use cryptovote_types::{CryptoId, ErrorCode, IdParseError};
use snafu::Snafu;

use crate::services::error_details::status_with_details;

// ============================================================================
// Service Errors (for gRPC services)
// ============================================================================

/// Errors from gRPC service operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ServiceError {
    /// The request carried a malformed identifier.
    #[snafu(display("Invalid argument: {source}"))]
    InvalidArgument { source: IdParseError },

    /// No record matches the identifier.
    #[snafu(display("Crypto not found: {id}"))]
    NotFound { id: CryptoId },

    /// The store rejected or failed the operation.
    #[snafu(display("Store operation failed: {source}"))]
    Store { source: StoreError },
}

impl ServiceError {
    /// Machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::InvalidArgument { source } => source.code(),
            ServiceError::NotFound { .. } => ErrorCode::CryptoNotFound,
            ServiceError::Store { source } => source.code(),
        }
    }

    fn context(&self) -> HashMap<String, String> {
        let mut context = HashMap::new();
        match self {
            ServiceError::InvalidArgument { source: IdParseError::InvalidHex { input, .. } } => {
                context.insert("input".to_owned(), input.clone());
            },
            ServiceError::NotFound { id } => {
                context.insert("crypto_id".to_owned(), id.to_string());
            },
            ServiceError::Store { .. } => {},
        }
        context
    }
}

/// gRPC status code for an [`ErrorCode`].
#[must_use]
pub fn grpc_code(code: ErrorCode) -> tonic::Code {
    match code {
        ErrorCode::InvalidCryptoId => tonic::Code::InvalidArgument,
        ErrorCode::CryptoNotFound => tonic::Code::NotFound,
        ErrorCode::StoreUnavailable | ErrorCode::StoreDecode => tonic::Code::Unavailable,
        ErrorCode::StoreQuery | ErrorCode::Internal => tonic::Code::Internal,
    }
}

impl From<ServiceError> for tonic::Status {
    fn from(err: ServiceError) -> Self {
        let code = err.code();
        status_with_details(grpc_code(code), err.to_string(), code, err.context())
    }
}
