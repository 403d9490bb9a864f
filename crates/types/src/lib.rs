//! Core types and errors for the crypto vote service.
//!
//! This crate provides the foundational types used throughout the workspace:
//! - The [`CryptoId`] identifier and its canonical hex encoding
//! - The [`Crypto`] entity and the write payloads that create or modify it
//! - Vote adjustments with floor-at-zero clamping
//! - Text normalization applied to names and descriptions on write
//! - Error types using snafu and the [`ErrorCode`] catalog

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod normalize;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{ErrorCode, IdParseError};
pub use types::*;
