//! Core type definitions for the crypto vote service.
//!
//! - [`CryptoId`]: store-assigned identifier with a canonical hex encoding
//! - [`Crypto`]: the persisted entity
//! - [`NewCrypto`] / [`CryptoUpdate`]: normalized write payloads
//! - [`VoteAdjustment`]: a +1/-1 change to one vote counter

use std::{fmt, str::FromStr};

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::{
    error::{IdParseError, InvalidHexSnafu},
    normalize::{normalize_description, normalize_name},
};

// ============================================================================
// Identifier
// ============================================================================

/// Unique identifier for a crypto record.
///
/// Wraps a 12-byte BSON `ObjectId` assigned by the store at insertion. The
/// wire encoding is the 24-character lowercase hex string, produced by
/// [`Display`](fmt::Display) and parsed by [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CryptoId(ObjectId);

impl CryptoId {
    /// Generates a fresh identifier.
    ///
    /// Used by stores that assign identifiers client-side.
    #[must_use]
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    /// Wraps an existing `ObjectId`.
    #[inline]
    #[must_use]
    pub const fn from_object_id(oid: ObjectId) -> Self {
        Self(oid)
    }

    /// Returns the underlying `ObjectId`.
    #[inline]
    #[must_use]
    pub const fn object_id(self) -> ObjectId {
        self.0
    }

    /// Parses the canonical hex encoding.
    ///
    /// # Errors
    ///
    /// Returns [`IdParseError::InvalidHex`] when `input` is not exactly 24
    /// hexadecimal characters.
    pub fn parse(input: &str) -> Result<Self, IdParseError> {
        ObjectId::parse_str(input).map(Self).context(InvalidHexSnafu { input })
    }
}

impl From<ObjectId> for CryptoId {
    #[inline]
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl From<CryptoId> for ObjectId {
    #[inline]
    fn from(id: CryptoId) -> Self {
        id.0
    }
}

impl fmt::Display for CryptoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl FromStr for CryptoId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// Entity
// ============================================================================

/// A named item with a description and a like/dislike tally.
///
/// `name` and `description` are stored normalized (see [`crate::normalize`]).
/// `vote_rate` is persisted and always equals `likes - dislikes` after a
/// successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crypto {
    /// Store-assigned identifier.
    pub id: CryptoId,
    /// Uppercased name.
    pub name: String,
    /// Title-cased description.
    pub description: String,
    /// Number of likes.
    pub likes: u64,
    /// Number of dislikes.
    pub dislikes: u64,
    /// `likes - dislikes`.
    pub vote_rate: i64,
    /// When the record was inserted.
    pub created_at: DateTime<Utc>,
    /// When the record was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Crypto {
    /// Builds a fresh record with zeroed counters.
    #[must_use]
    pub fn create(id: CryptoId, new: NewCrypto, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            likes: 0,
            dislikes: 0,
            vote_rate: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Total number of votes cast (`likes + dislikes`).
    #[must_use]
    pub const fn total_votes(&self) -> u64 {
        self.likes.saturating_add(self.dislikes)
    }

    /// Overwrites name and description, refreshing `updated_at`.
    pub fn apply_update(&mut self, update: CryptoUpdate, now: DateTime<Utc>) {
        self.name = update.name;
        self.description = update.description;
        self.updated_at = now;
    }

    /// Adjusts one counter, recomputes `vote_rate`, and refreshes `updated_at`.
    pub fn apply_vote(&mut self, adjustment: VoteAdjustment, now: DateTime<Utc>) {
        match adjustment.counter {
            VoteCounter::Likes => self.likes = adjustment.apply(self.likes),
            VoteCounter::Dislikes => self.dislikes = adjustment.apply(self.dislikes),
        }
        self.vote_rate = vote_rate(self.likes, self.dislikes);
        self.updated_at = now;
    }
}

/// Computes `likes - dislikes`, saturating at the `i64` bounds.
#[must_use]
pub fn vote_rate(likes: u64, dislikes: u64) -> i64 {
    let likes = i64::try_from(likes).unwrap_or(i64::MAX);
    let dislikes = i64::try_from(dislikes).unwrap_or(i64::MAX);
    likes.saturating_sub(dislikes)
}

// ============================================================================
// Write payloads
// ============================================================================

/// Payload for inserting a new record.
///
/// Construction normalizes the fields, so a `NewCrypto` always holds the
/// exact text that will be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCrypto {
    name: String,
    description: String,
}

impl NewCrypto {
    /// Normalizes and wraps caller input.
    #[must_use]
    pub fn new(name: &str, description: &str) -> Self {
        Self { name: normalize_name(name), description: normalize_description(description) }
    }

    /// Normalized name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Payload for overwriting the text fields of an existing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoUpdate {
    name: String,
    description: String,
}

impl CryptoUpdate {
    /// Normalizes and wraps caller input.
    #[must_use]
    pub fn new(name: &str, description: &str) -> Self {
        Self { name: normalize_name(name), description: normalize_description(description) }
    }

    /// Normalized name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

// ============================================================================
// Votes
// ============================================================================

/// Which counter a vote adjustment targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteCounter {
    /// The `likes` counter.
    Likes,
    /// The `dislikes` counter.
    Dislikes,
}

impl VoteCounter {
    /// Persisted field name of the counter.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Likes => "likes",
            Self::Dislikes => "dislikes",
        }
    }
}

/// Direction of a vote adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteDirection {
    /// Add one vote.
    Increment,
    /// Remove one vote, never going below zero.
    Decrement,
}

impl VoteDirection {
    /// Signed step applied to the counter.
    #[must_use]
    pub const fn delta(self) -> i64 {
        match self {
            Self::Increment => 1,
            Self::Decrement => -1,
        }
    }
}

/// A single +1/-1 change to one vote counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoteAdjustment {
    /// Target counter.
    pub counter: VoteCounter,
    /// Step direction.
    pub direction: VoteDirection,
}

impl VoteAdjustment {
    /// `likes += 1`.
    pub const ADD_LIKE: Self =
        Self { counter: VoteCounter::Likes, direction: VoteDirection::Increment };
    /// `likes = max(likes - 1, 0)`.
    pub const REMOVE_LIKE: Self =
        Self { counter: VoteCounter::Likes, direction: VoteDirection::Decrement };
    /// `dislikes += 1`.
    pub const ADD_DISLIKE: Self =
        Self { counter: VoteCounter::Dislikes, direction: VoteDirection::Increment };
    /// `dislikes = max(dislikes - 1, 0)`.
    pub const REMOVE_DISLIKE: Self =
        Self { counter: VoteCounter::Dislikes, direction: VoteDirection::Decrement };

    /// Applies the step to a counter value, clamping at zero.
    #[must_use]
    pub const fn apply(self, current: u64) -> u64 {
        match self.direction {
            VoteDirection::Increment => current.saturating_add(1),
            VoteDirection::Decrement => current.saturating_sub(1),
        }
    }

    /// Short label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match (self.counter, self.direction) {
            (VoteCounter::Likes, VoteDirection::Increment) => "add_like",
            (VoteCounter::Likes, VoteDirection::Decrement) => "remove_like",
            (VoteCounter::Dislikes, VoteDirection::Increment) => "add_dislike",
            (VoteCounter::Dislikes, VoteDirection::Decrement) => "remove_dislike",
        }
    }
}

impl fmt::Display for VoteAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample() -> Crypto {
        Crypto::create(
            CryptoId::generate(),
            NewCrypto::new("bitcoin", "digital money"),
            Utc::now(),
        )
    }

    #[test]
    fn test_crypto_id_hex_round_trip() {
        let id = CryptoId::generate();
        let hex = id.to_string();
        assert_eq!(hex.len(), 24);
        assert_eq!(hex.parse::<CryptoId>().unwrap(), id);
    }

    #[test]
    fn test_crypto_id_rejects_malformed_input() {
        for input in ["", "xyz", "5f2b5c1e9d3e4a0012345678ff", "zz2b5c1e9d3e4a0012345678"] {
            let err = CryptoId::parse(input).unwrap_err();
            assert!(
                err.to_string().contains("invalid crypto id"),
                "unexpected message for {input:?}: {err}"
            );
        }
    }

    #[test]
    fn test_create_normalizes_and_zeroes_counters() {
        let crypto = sample();
        assert_eq!(crypto.name, "BITCOIN");
        assert_eq!(crypto.description, "Digital Money");
        assert_eq!(crypto.likes, 0);
        assert_eq!(crypto.dislikes, 0);
        assert_eq!(crypto.vote_rate, 0);
        assert_eq!(crypto.created_at, crypto.updated_at);
    }

    #[test]
    fn test_likes_sequence_tracks_vote_rate() {
        let mut crypto = sample();
        let now = Utc::now();
        for _ in 0..3 {
            crypto.apply_vote(VoteAdjustment::ADD_LIKE, now);
        }
        crypto.apply_vote(VoteAdjustment::REMOVE_LIKE, now);

        assert_eq!(crypto.likes, 2);
        assert_eq!(crypto.vote_rate, 2);
    }

    #[test]
    fn test_decrement_clamps_at_zero() {
        let mut crypto = sample();
        let now = Utc::now();
        crypto.apply_vote(VoteAdjustment::REMOVE_LIKE, now);
        crypto.apply_vote(VoteAdjustment::REMOVE_DISLIKE, now);

        assert_eq!(crypto.likes, 0);
        assert_eq!(crypto.dislikes, 0);
        assert_eq!(crypto.vote_rate, 0);
    }

    #[test]
    fn test_dislikes_drive_vote_rate_negative() {
        let mut crypto = sample();
        let now = Utc::now();
        crypto.apply_vote(VoteAdjustment::ADD_LIKE, now);
        crypto.apply_vote(VoteAdjustment::ADD_DISLIKE, now);
        crypto.apply_vote(VoteAdjustment::ADD_DISLIKE, now);

        assert_eq!(crypto.vote_rate, -1);
        assert_eq!(crypto.total_votes(), 3);
    }

    #[test]
    fn test_apply_update_refreshes_timestamp_only() {
        let mut crypto = sample();
        let created = crypto.created_at;
        let later = created + chrono::Duration::seconds(5);
        crypto.apply_update(CryptoUpdate::new("ether", "smart contracts"), later);

        assert_eq!(crypto.name, "ETHER");
        assert_eq!(crypto.description, "Smart Contracts");
        assert_eq!(crypto.created_at, created);
        assert_eq!(crypto.updated_at, later);
    }

    #[test]
    fn test_vote_rate_saturates() {
        assert_eq!(vote_rate(u64::MAX, 0), i64::MAX);
        assert_eq!(vote_rate(0, 3), -3);
    }

    #[test]
    fn test_vote_adjustment_labels() {
        assert_eq!(VoteAdjustment::ADD_LIKE.to_string(), "add_like");
        assert_eq!(VoteAdjustment::REMOVE_DISLIKE.as_str(), "remove_dislike");
        assert_eq!(VoteAdjustment::ADD_DISLIKE.counter.field_name(), "dislikes");
        assert_eq!(VoteAdjustment::REMOVE_LIKE.direction.delta(), -1);
    }

    mod proptest_votes {
        use proptest::prelude::*;

        use super::*;

        fn arb_adjustment() -> impl Strategy<Value = VoteAdjustment> {
            prop_oneof![
                Just(VoteAdjustment::ADD_LIKE),
                Just(VoteAdjustment::REMOVE_LIKE),
                Just(VoteAdjustment::ADD_DISLIKE),
                Just(VoteAdjustment::REMOVE_DISLIKE),
            ]
        }

        proptest! {
            /// N likes followed by M removals leave `max(N - M, 0)` likes.
            #[test]
            fn prop_likes_then_removals_clamp(adds in 0usize..40, removes in 0usize..60) {
                let mut crypto = sample();
                let now = Utc::now();
                for _ in 0..adds {
                    crypto.apply_vote(VoteAdjustment::ADD_LIKE, now);
                }
                for _ in 0..removes {
                    crypto.apply_vote(VoteAdjustment::REMOVE_LIKE, now);
                }

                prop_assert_eq!(crypto.likes, adds.saturating_sub(removes) as u64);
                prop_assert_eq!(crypto.dislikes, 0);
                prop_assert_eq!(crypto.vote_rate, crypto.likes as i64);
            }

            /// Any vote sequence matches a per-step clamped model, and the
            /// vote rate always equals likes minus dislikes.
            #[test]
            fn prop_vote_sequence_matches_model(
                steps in proptest::collection::vec(arb_adjustment(), 0..64)
            ) {
                let mut crypto = sample();
                let now = Utc::now();
                let (mut likes, mut dislikes) = (0u64, 0u64);

                for step in steps {
                    crypto.apply_vote(step, now);
                    match step.counter {
                        VoteCounter::Likes => likes = step.apply(likes),
                        VoteCounter::Dislikes => dislikes = step.apply(dislikes),
                    }
                    prop_assert_eq!(crypto.likes, likes);
                    prop_assert_eq!(crypto.dislikes, dislikes);
                    prop_assert_eq!(crypto.vote_rate, likes as i64 - dislikes as i64);
                    prop_assert_eq!(crypto.total_votes(), likes + dislikes);
                }
            }

            /// Creation uppercases any name and starts with zeroed counters.
            #[test]
            fn prop_create_uppercases_and_zeroes(name in any::<String>(), description in any::<String>()) {
                let crypto = Crypto::create(
                    CryptoId::generate(),
                    NewCrypto::new(&name, &description),
                    Utc::now(),
                );

                prop_assert_eq!(&crypto.name, &name.to_uppercase());
                prop_assert_eq!(crypto.likes, 0);
                prop_assert_eq!(crypto.dislikes, 0);
                prop_assert_eq!(crypto.vote_rate, 0);
                prop_assert_eq!(crypto.created_at, crypto.updated_at);
            }
        }
    }
}
