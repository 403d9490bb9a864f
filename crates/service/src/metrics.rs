//! Observability metrics exposed via Prometheus using the `metrics` crate.
//!
//! ## Metric Naming Conventions
//!
//! All metrics follow the pattern: `cryptovote_{subsystem}_{name}_{unit}`
//!
//! - Counters: `_total` suffix
//! - Histograms: `_seconds` suffix
//!
//! Without an installed recorder every call is a no-op.

use cryptovote_types::VoteAdjustment;
use metrics::{counter, histogram};

// =============================================================================
// Metric Names (constants for consistency)
// =============================================================================

const GRPC_REQUESTS_TOTAL: &str = "cryptovote_grpc_requests_total";
const GRPC_REQUEST_LATENCY: &str = "cryptovote_grpc_request_latency_seconds";
const VOTES_TOTAL: &str = "cryptovote_votes_total";
const STREAM_ERRORS_TOTAL: &str = "cryptovote_stream_errors_total";

/// Histogram buckets (seconds) for request latency.
pub const LATENCY_HISTOGRAM_BUCKETS: [f64; 11] =
    [0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0, 10.0];

// =============================================================================
// gRPC Metrics
// =============================================================================

/// Records a completed gRPC request.
#[inline]
pub fn record_grpc_request(method: &'static str, code: tonic::Code, latency_secs: f64) {
    counter!(GRPC_REQUESTS_TOTAL,
        "method" => method,
        "status" => status_label(code)
    )
    .increment(1);
    histogram!(GRPC_REQUEST_LATENCY, "method" => method).record(latency_secs);
}

/// Records a listing stream that ended with an error.
#[inline]
pub fn record_stream_error(method: &'static str) {
    counter!(STREAM_ERRORS_TOTAL, "method" => method).increment(1);
}

/// Records an applied vote adjustment.
#[inline]
pub fn record_vote(adjustment: VoteAdjustment) {
    counter!(VOTES_TOTAL, "kind" => adjustment.as_str()).increment(1);
}

/// Canonical upper-snake name of a gRPC status code.
pub fn status_label(code: tonic::Code) -> &'static str {
    match code {
        tonic::Code::Ok => "OK",
        tonic::Code::Cancelled => "CANCELLED",
        tonic::Code::Unknown => "UNKNOWN",
        tonic::Code::InvalidArgument => "INVALID_ARGUMENT",
        tonic::Code::DeadlineExceeded => "DEADLINE_EXCEEDED",
        tonic::Code::NotFound => "NOT_FOUND",
        tonic::Code::AlreadyExists => "ALREADY_EXISTS",
        tonic::Code::PermissionDenied => "PERMISSION_DENIED",
        tonic::Code::ResourceExhausted => "RESOURCE_EXHAUSTED",
        tonic::Code::FailedPrecondition => "FAILED_PRECONDITION",
        tonic::Code::Aborted => "ABORTED",
        tonic::Code::OutOfRange => "OUT_OF_RANGE",
        tonic::Code::Unimplemented => "UNIMPLEMENTED",
        tonic::Code::Internal => "INTERNAL",
        tonic::Code::Unavailable => "UNAVAILABLE",
        tonic::Code::DataLoss => "DATA_LOSS",
        tonic::Code::Unauthenticated => "UNAUTHENTICATED",
    }
}
