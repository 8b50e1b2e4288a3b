//! Local Store Module
//!
//! Single-threaded core of the local tier: HashMap storage with LRU tracking
//! and read-time TTL checks. [`LocalTier`](super::LocalTier) wraps it in a lock.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::{CacheError, Result};
use crate::local::{LocalEntry, LocalStats, LruTracker, MAX_KEY_LENGTH, MAX_VALUE_SIZE};

// == Local Store ==
#[derive(Debug)]
pub struct LocalStore {
    entries: HashMap<String, LocalEntry>,
    lru: LruTracker,
    stats: LocalStats,
    max_entries: usize,
    ttl: Duration,
}

impl LocalStore {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` entries (at least one),
    /// each readable for `ttl` after it was written.
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: LocalStats::new(),
            max_entries: max_entries.max(1),
            ttl,
        }
    }

    // == Put ==
    /// Stores a payload, overwriting any previous entry and restarting its TTL.
    ///
    /// A new key arriving at capacity evicts the least recently used entry.
    pub fn put(&mut self, key: &str, payload: Vec<u8>) -> Result<()> {
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidRequest(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        if payload.len() > MAX_VALUE_SIZE {
            return Err(CacheError::InvalidRequest(format!(
                "Payload exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        let is_overwrite = self.entries.contains_key(key);
        if !is_overwrite && self.entries.len() >= self.max_entries {
            if let Some(evicted_key) = self.lru.evict_oldest() {
                self.entries.remove(&evicted_key);
                self.stats.record_eviction();
            }
        }

        self.entries.insert(key.to_string(), LocalEntry::new(payload));
        self.lru.touch(key);
        self.stats.set_total_entries(self.entries.len());

        Ok(())
    }

    // == Get ==
    /// Retrieves a payload.
    ///
    /// Any resident entry is marked as recently used, expired or not. Expired
    /// entries are reported as [`CacheError::Expired`] but left in place.
    pub fn get(&mut self, key: &str) -> Result<Vec<u8>> {
        let Some(entry) = self.entries.get(key) else {
            self.stats.record_miss();
            return Err(CacheError::NotFound(key.to_string()));
        };

        let expired = entry.is_expired(self.ttl);
        let payload = (!expired).then(|| entry.payload.clone());
        self.lru.touch(key);

        match payload {
            Some(payload) => {
                self.stats.record_hit();
                Ok(payload)
            }
            None => {
                self.stats.record_expired();
                Err(CacheError::Expired(key.to_string()))
            }
        }
    }

    /// Returns the resident entry regardless of TTL, without touching LRU order.
    pub fn peek(&self, key: &str) -> Option<&LocalEntry> {
        self.entries.get(key)
    }

    // == Remove ==
    /// Removes an entry; absent keys are ignored.
    pub fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
    }

    pub fn stats(&self) -> LocalStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}
