//! Store backend abstraction for crypto records.
//!
//! The [`CryptoStore`] trait hides the document store behind the handful of
//! operations the service needs, allowing both MongoDB (production) and
//! in-memory (testing) implementations.
//!
//! # Listing order
//!
//! Listing is streamed. [`ListQuery::all`] sorts by `vote_rate` descending and
//! [`ListQuery::name_contains`] sorts by `likes` descending. Both break ties
//! on ascending id so the order is total and both backends agree.

mod memory;
mod mongo;

use std::cmp::Ordering;

use async_trait::async_trait;
use cryptovote_types::{Crypto, CryptoId, CryptoUpdate, NewCrypto, VoteAdjustment};
use futures::stream::BoxStream;
use regex::{Regex, RegexBuilder};

pub use memory::InMemoryCryptoStore;
pub use mongo::{MongoConfig, MongoCryptoStore};

use crate::error::Result;

/// Stream of records produced by [`CryptoStore::find_all`].
///
/// An `Err` item means the scan failed at that point; consumers stop there.
pub type CryptoStream = BoxStream<'static, Result<Crypto>>;

/// Sort order for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    /// Highest `vote_rate` first.
    #[default]
    VoteRateDesc,
    /// Most `likes` first.
    LikesDesc,
}

/// Selection and order for [`CryptoStore::find_all`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListQuery {
    name_contains: Option<String>,
    order: ListOrder,
}

impl ListQuery {
    /// Every record, highest `vote_rate` first.
    #[must_use]
    pub fn all() -> Self {
        Self { name_contains: None, order: ListOrder::VoteRateDesc }
    }

    /// Records whose name contains `text` (case-insensitive, literal match),
    /// most `likes` first.
    #[must_use]
    pub fn name_contains(text: impl Into<String>) -> Self {
        Self { name_contains: Some(text.into()), order: ListOrder::LikesDesc }
    }

    /// Escaped regex for the name filter, if any.
    ///
    /// MongoDB evaluates it as `$regex` with option `i` and [`Self::matcher`]
    /// compiles the same pattern case-insensitively. Both fold case one
    /// character at a time, so `"i"` does not match `"İ"` in either backend.
    #[must_use]
    pub fn name_pattern(&self) -> Option<String> {
        self.name_contains.as_deref().map(regex::escape)
    }

    /// Sort order.
    #[must_use]
    pub fn order(&self) -> ListOrder {
        self.order
    }

    /// Compiles the name filter for in-process matching.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern exceeds the regex size limit.
    pub fn matcher(&self) -> std::result::Result<NameMatcher, regex::Error> {
        let regex = self
            .name_pattern()
            .map(|pattern| RegexBuilder::new(&pattern).case_insensitive(true).build())
            .transpose()?;
        Ok(NameMatcher(regex))
    }

    /// Total order over selected records.
    #[must_use]
    pub fn compare(&self, a: &Crypto, b: &Crypto) -> Ordering {
        let primary = match self.order {
            ListOrder::VoteRateDesc => b.vote_rate.cmp(&a.vote_rate),
            ListOrder::LikesDesc => b.likes.cmp(&a.likes),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Compiled name filter of a [`ListQuery`].
#[derive(Debug, Clone)]
pub struct NameMatcher(Option<Regex>);

impl NameMatcher {
    /// Whether `crypto` is selected by the filter.
    #[must_use]
    pub fn matches(&self, crypto: &Crypto) -> bool {
        self.0.as_ref().is_none_or(|regex| regex.is_match(&crypto.name))
    }
}

/// Persistence operations for crypto records.
///
/// Mutations are atomic per record: each one is a single read-modify-write
/// that returns the post-mutation state, or `None` when no record has the id.
#[async_trait]
pub trait CryptoStore: Send + Sync + 'static {
    /// Inserts a record with zeroed counters and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns a store error if the insert fails.
    async fn insert(&self, new: NewCrypto) -> Result<Crypto>;

    /// Fetches a record by id.
    ///
    /// # Errors
    ///
    /// Returns a store error if the lookup fails or the document is unreadable.
    async fn find_one(&self, id: CryptoId) -> Result<Option<Crypto>>;

    /// Opens a stream over the records selected by `query`.
    ///
    /// # Errors
    ///
    /// Returns a store error if the scan cannot be started. Failures while
    /// iterating surface as `Err` items in the stream.
    async fn find_all(&self, query: ListQuery) -> Result<CryptoStream>;

    /// Overwrites name and description, refreshing `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns a store error if the update fails.
    async fn update(&self, id: CryptoId, update: CryptoUpdate) -> Result<Option<Crypto>>;

    /// Applies a vote adjustment and recomputes `vote_rate` in one step.
    ///
    /// # Errors
    ///
    /// Returns a store error if the update fails.
    async fn adjust_votes(&self, id: CryptoId, adjustment: VoteAdjustment)
    -> Result<Option<Crypto>>;

    /// Removes a record. Returns whether one was deleted.
    ///
    /// # Errors
    ///
    /// Returns a store error if the delete fails.
    async fn delete_one(&self, id: CryptoId) -> Result<bool>;
}
