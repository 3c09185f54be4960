//! Single-entry cache of the distinct metadata key set.
//!
//! Holds one global value: the set of every metadata key seen across the
//! whole collection. A `tokio::sync::Mutex` over the entry serializes every
//! read-modify-write, so two concurrent merges both survive - lost updates
//! here would silently under-report keys, which is a correctness violation.
//!
//! The cache itself is policy-free: it exposes `merge`, `populate_if_absent`
//! and `invalidate`, and the write path decides which to call (see
//! [`MetadataKeyPolicy`](crate::config::MetadataKeyPolicy) and the
//! [`invalidation`](crate::invalidation) table). Callers never run store I/O
//! while holding the entry lock; the aggregation happens outside and only the
//! resulting set crosses the critical section.

use std::collections::HashSet;
use tokio::sync::Mutex;

/// Thread-safe cache of the global distinct-metadata-key set.
#[derive(Default)]
pub struct MetadataKeyCache {
    entry: Mutex<Option<HashSet<String>>>,
}

impl MetadataKeyCache {
    pub fn new() -> Self {
        MetadataKeyCache {
            entry: Mutex::new(None),
        }
    }

    /// Current cached set, if one is resident.
    pub async fn get(&self) -> Option<HashSet<String>> {
        let entry = self.entry.lock().await;
        match entry.as_ref() {
            Some(keys) => {
                debug!("✓ MetadataKeyCache GET -> HIT ({} keys)", keys.len());
                Some(keys.clone())
            }
            None => {
                debug!("✓ MetadataKeyCache GET -> MISS");
                None
            }
        }
    }

    /// Install `keys` unless another request already populated the entry.
    ///
    /// Returns the set that ended up resident. A read that lost the race to
    /// populate keeps the winner's set rather than overwriting it - the
    /// winner may have observed merges this reader's scan predates.
    pub async fn populate_if_absent(&self, keys: HashSet<String>) -> HashSet<String> {
        let mut entry = self.entry.lock().await;
        match entry.as_ref() {
            Some(resident) => resident.clone(),
            None => {
                debug!("✓ MetadataKeyCache POPULATE ({} keys)", keys.len());
                *entry = Some(keys.clone());
                keys
            }
        }
    }

    /// Union `keys` into the resident set, in place.
    ///
    /// A merge against an absent entry is a no-op: the cache is never
    /// populated speculatively from a single record's keys, because one
    /// record cannot stand in for the whole collection.
    pub async fn merge(&self, keys: HashSet<String>) {
        let mut entry = self.entry.lock().await;
        if let Some(resident) = entry.as_mut() {
            debug!("✓ MetadataKeyCache MERGE ({} keys in)", keys.len());
            resident.extend(keys);
        } else {
            debug!("✓ MetadataKeyCache MERGE skipped (entry absent)");
        }
    }

    /// Drop the cached set; the next read recomputes from the store.
    pub async fn invalidate(&self) {
        *self.entry.lock().await = None;
        debug!("✓ MetadataKeyCache INVALIDATE");
    }

    /// Whether a set is currently resident.
    pub async fn is_populated(&self) -> bool {
        self.entry.lock().await.is_some()
    }
}
