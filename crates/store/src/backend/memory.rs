//! In-memory crypto store for testing.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use cryptovote_types::{Crypto, CryptoId, CryptoUpdate, NewCrypto, VoteAdjustment};
use futures::stream::{self, StreamExt};
use parking_lot::{Mutex, RwLock};

use super::{CryptoStore, CryptoStream, ListQuery};
use crate::error::{Result, StoreError};

/// In-memory crypto store.
///
/// All data is held in memory and lost when the store is dropped. Each
/// mutation runs under one write lock, so concurrent votes on the same record
/// are never lost.
///
/// Two failure hooks let tests exercise error paths:
/// [`fail_next_scan_after`](Self::fail_next_scan_after) and
/// [`fail_writes`](Self::fail_writes).
#[derive(Default)]
pub struct InMemoryCryptoStore {
    records: RwLock<BTreeMap<CryptoId, Crypto>>,
    scan_failure: Mutex<Option<usize>>,
    writes_fail: Mutex<bool>,
}

impl InMemoryCryptoStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Makes the next [`find_all`](CryptoStore::find_all) yield `count`
    /// records and then a decode error. The hook resets after one scan.
    pub fn fail_next_scan_after(&self, count: usize) {
        *self.scan_failure.lock() = Some(count);
    }

    /// Makes every insert, update, vote, and delete fail until reset.
    pub fn fail_writes(&self, fail: bool) {
        *self.writes_fail.lock() = fail;
    }

    fn check_writable(&self, operation: &'static str) -> Result<()> {
        if *self.writes_fail.lock() {
            return Err(StoreError::Backend { operation, message: "write rejected".to_owned() });
        }
        Ok(())
    }

    fn modify(&self, id: CryptoId, f: impl FnOnce(&mut Crypto)) -> Option<Crypto> {
        let mut records = self.records.write();
        let record = records.get_mut(&id)?;
        f(record);
        Some(record.clone())
    }
}

#[async_trait]
impl CryptoStore for InMemoryCryptoStore {
    async fn insert(&self, new: NewCrypto) -> Result<Crypto> {
        self.check_writable("insert_one")?;
        let crypto = Crypto::create(CryptoId::generate(), new, Utc::now());
        self.records.write().insert(crypto.id, crypto.clone());
        Ok(crypto)
    }

    async fn find_one(&self, id: CryptoId) -> Result<Option<Crypto>> {
        Ok(self.records.read().get(&id).cloned())
    }

    async fn find_all(&self, query: ListQuery) -> Result<CryptoStream> {
        let matcher = query
            .matcher()
            .map_err(|e| StoreError::Backend { operation: "find", message: e.to_string() })?;
        let mut selected: Vec<Crypto> =
            self.records.read().values().filter(|c| matcher.matches(c)).cloned().collect();
        selected.sort_by(|a, b| query.compare(a, b));

        let items: Vec<Result<Crypto>> = match self.scan_failure.lock().take() {
            None => selected.into_iter().map(Ok).collect(),
            Some(count) => selected
                .into_iter()
                .take(count)
                .map(Ok)
                .chain(std::iter::once(Err(StoreError::Decode {
                    message: format!("injected failure after {count} records"),
                })))
                .collect(),
        };
        Ok(stream::iter(items).boxed())
    }

    async fn update(&self, id: CryptoId, update: CryptoUpdate) -> Result<Option<Crypto>> {
        self.check_writable("find_one_and_update")?;
        Ok(self.modify(id, |c| c.apply_update(update, Utc::now())))
    }

    async fn adjust_votes(
        &self,
        id: CryptoId,
        adjustment: VoteAdjustment,
    ) -> Result<Option<Crypto>> {
        self.check_writable("find_one_and_update")?;
        Ok(self.modify(id, |c| c.apply_vote(adjustment, Utc::now())))
    }

    async fn delete_one(&self, id: CryptoId) -> Result<bool> {
        self.check_writable("delete_one")?;
        Ok(self.records.write().remove(&id).is_some())
    }
}
