//! Shared service helpers for id parsing, response finishing, and listing streams.

use std::{pin::Pin, time::Instant};

use cryptovote_proto::proto::ListCryptosResponse;
use cryptovote_store::CryptoStream;
use cryptovote_types::CryptoId;
use futures::{Stream, StreamExt, future};
use snafu::ResultExt;
use tonic::{Response, Status};
use tracing::warn;

use crate::{
    error::{InvalidArgumentSnafu, ServiceError},
    metrics,
};

/// Server-streaming response type shared by the listing RPCs.
pub type ListStream = Pin<Box<dyn Stream<Item = Result<ListCryptosResponse, Status>> + Send>>;

/// Parses a wire identifier and records it on the current span.
pub(crate) fn parse_id(raw: &str) -> Result<CryptoId, ServiceError> {
    let id = CryptoId::parse(raw).context(InvalidArgumentSnafu)?;
    tracing::Span::current().record("crypto_id", tracing::field::display(id));
    Ok(id)
}

/// Converts a handler result into a gRPC response, recording metrics and
/// logging failures.
pub(crate) fn finish<T>(
    method: &'static str,
    start: Instant,
    result: Result<T, ServiceError>,
) -> Result<Response<T>, Status> {
    let latency = start.elapsed().as_secs_f64();
    match result {
        Ok(message) => {
            metrics::record_grpc_request(method, tonic::Code::Ok, latency);
            Ok(Response::new(message))
        },
        Err(err) => {
            let status = Status::from(err);
            if matches!(status.code(), tonic::Code::Internal | tonic::Code::Unavailable) {
                warn!(method, code = ?status.code(), error = %status.message(), "Request failed");
            }
            metrics::record_grpc_request(method, status.code(), latency);
            Err(status)
        },
    }
}

/// Adapts a store scan into a listing response stream.
///
/// The first store error is sent as a failure status and ends the stream.
pub(crate) fn list_stream(method: &'static str, records: CryptoStream) -> ListStream {
    let stream = records.scan(false, move |failed, item| {
        if *failed {
            return future::ready(None);
        }
        let message = match item {
            Ok(crypto) => Ok(ListCryptosResponse { crypto: Some(crypto.into()) }),
            Err(source) => {
                *failed = true;
                warn!(method, error = %source, "Listing stream aborted");
                metrics::record_stream_error(method);
                Err(Status::from(ServiceError::Store { source }))
            },
        };
        future::ready(Some(message))
    });
    Box::pin(stream)
}
