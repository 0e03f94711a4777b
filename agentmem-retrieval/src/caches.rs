//! Feedback score cache and optional query-result cache. The
//! prepared-statement cache and the entity index — the other two caches in
//! the system — live in `agentmem-storage` and `entity.rs` respectively.

use std::time::Duration;

use moka::sync::Cache;

use agentmem_core::errors::CoreResult;
use agentmem_core::model::{EntryId, EntryKind, FeedbackScore};
use agentmem_core::traits::StorageDriver;

use crate::request::QueryResponse;

/// Read-through cache over `StorageDriver::feedback_rollup`, keyed by
/// `(kind, entry_id)`, invalidated on `entry_changed`.
pub struct FeedbackCache {
    cache: Cache<(EntryKind, EntryId), FeedbackScore>,
}

impl FeedbackCache {
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(Duration::from_secs(ttl_secs))
                .build(),
        }
    }

    /// Returns the cached score, or reads through to `storage` and caches
    /// the result on a miss. Absence of any feedback is cached as `None`
    /// implicitly by simply not inserting — a later write will populate it.
    pub fn get_or_load(
        &self,
        storage: &dyn StorageDriver,
        kind: EntryKind,
        id: &EntryId,
    ) -> CoreResult<Option<FeedbackScore>> {
        let key = (kind, id.clone());
        if let Some(hit) = self.cache.get(&key) {
            return Ok(Some(hit));
        }
        match storage.feedback_rollup(kind, id)? {
            Some(score) => {
                self.cache.insert(key, score.clone());
                Ok(Some(score))
            }
            None => Ok(None),
        }
    }

    pub fn invalidate(&self, kind: EntryKind, id: &EntryId) {
        self.cache.invalidate(&(kind, id.clone()));
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

/// Optional cache of full query responses, keyed by a stable hash of the
/// normalized request. Invalidated globally on any write event,
/// since a single mutation can affect arbitrarily many cached queries.
pub struct QueryResultCache {
    cache: Cache<u64, QueryResponse>,
    enabled: bool,
}

impl QueryResultCache {
    pub fn new(enabled: bool, capacity: u64, ttl_secs: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(Duration::from_secs(ttl_secs))
                .build(),
            enabled,
        }
    }

    pub fn get(&self, key: u64) -> Option<QueryResponse> {
        if !self.enabled {
            return None;
        }
        self.cache.get(&key)
    }

    pub fn put(&self, key: u64, response: QueryResponse) {
        if self.enabled {
            self.cache.insert(key, response);
        }
    }

    /// Invalidated globally on any write.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}
