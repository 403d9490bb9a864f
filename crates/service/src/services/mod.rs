//! gRPC service implementations.

mod crypto;
pub(crate) mod error_details;
mod helpers;

pub use crypto::CryptoServiceImpl;
pub use helpers::ListStream;
