//! Conversions from domain types to generated proto types.

use chrono::{DateTime, Utc};
use cryptovote_types::Crypto;
use prost_types::Timestamp;

use crate::proto;

/// Converts a chrono timestamp to its protobuf form.
#[must_use]
pub fn timestamp_from_chrono(dt: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: dt.timestamp(),
        nanos: i32::try_from(dt.timestamp_subsec_nanos()).unwrap_or(i32::MAX),
    }
}

impl From<&Crypto> for proto::Crypto {
    fn from(crypto: &Crypto) -> Self {
        proto::Crypto {
            id: crypto.id.to_string(),
            name: crypto.name.clone(),
            description: crypto.description.clone(),
            likes: crypto.likes,
            dislikes: crypto.dislikes,
            vote_rate: crypto.vote_rate,
            created_at: Some(timestamp_from_chrono(crypto.created_at)),
            updated_at: Some(timestamp_from_chrono(crypto.updated_at)),
        }
    }
}

impl From<Crypto> for proto::Crypto {
    fn from(crypto: Crypto) -> Self {
        proto::Crypto::from(&crypto)
    }
}
