//! Persisted document shape for crypto records.
//!
//! Field names are camelCase, matching the collection layout
//! (`_id`, `name`, `description`, `likes`, `dislikes`, `voteRate`,
//! `createdAt`, `updatedAt`). Counters are stored as `Int64` so that the
//! aggregation-pipeline vote update can do arithmetic on them.

use bson::oid::ObjectId;
use cryptovote_types::{Crypto, CryptoId, NewCrypto};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CryptoDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub description: String,
    pub likes: i64,
    pub dislikes: i64,
    pub vote_rate: i64,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl CryptoDocument {
    /// Fresh document without an `_id`; the store assigns one on insert.
    pub fn new_record(new: &NewCrypto, now: bson::DateTime) -> Self {
        Self {
            id: None,
            name: new.name().to_owned(),
            description: new.description().to_owned(),
            likes: 0,
            dislikes: 0,
            vote_rate: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Converts to the domain type, rejecting documents that break the
    /// record invariants.
    pub fn into_crypto(self) -> Result<Crypto> {
        let oid = self.id.ok_or_else(|| StoreError::InvalidDocument {
            id: "<missing>".to_owned(),
            reason: "missing _id".to_owned(),
        })?;
        let counter = |field: &str, value: i64| {
            u64::try_from(value).map_err(|_| StoreError::InvalidDocument {
                id: oid.to_hex(),
                reason: format!("negative {field}: {value}"),
            })
        };
        let likes = counter("likes", self.likes)?;
        let dislikes = counter("dislikes", self.dislikes)?;

        Ok(Crypto {
            id: CryptoId::from_object_id(oid),
            name: self.name,
            description: self.description,
            likes,
            dislikes,
            vote_rate: self.vote_rate,
            created_at: self.created_at.to_chrono(),
            updated_at: self.updated_at.to_chrono(),
        })
    }
}
