//! Persistence for crypto records.
//!
//! The service talks to storage only through the [`CryptoStore`] trait:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              CryptoServiceImpl               │
//! └────────────────┬────────────────────────────┘
//!                  │  Arc<dyn CryptoStore>
//! ┌────────────────▼────────────────────────────┐
//! │   MongoCryptoStore  /  InMemoryCryptoStore   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! [`MongoCryptoStore`] keeps one document per record in a single collection.
//! [`InMemoryCryptoStore`] mirrors its ordering and atomicity for tests.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
mod document;
pub mod error;

pub use backend::{
    CryptoStore, CryptoStream, InMemoryCryptoStore, ListOrder, ListQuery, MongoConfig,
    MongoCryptoStore, NameMatcher,
};
pub use error::{Result, StoreError};
