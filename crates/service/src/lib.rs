//! gRPC service layer for the crypto vote service.
//!
//! - [`services::CryptoServiceImpl`]: the `crypto.v1.CryptoService` handlers
//! - [`server::CryptoServer`]: tonic server with tower limits and reflection
//! - [`error::ServiceError`]: handler errors and their `tonic::Status` mapping
//! - [`metrics`]: Prometheus counters and histograms

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Handlers return tonic::Status
#![allow(clippy::result_large_err)]

pub mod error;
pub mod metrics;
pub mod server;
pub mod services;

pub use error::ServiceError;
pub use server::{CryptoServer, ServeError};
pub use services::CryptoServiceImpl;
