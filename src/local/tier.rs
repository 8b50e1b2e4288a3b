//! Local Tier Module
//!
//! Thread-safe handle over [`LocalStore`], shared by concurrent callers.

use std::time::Duration;

use parking_lot::Mutex;
use tracing::trace;

use crate::error::Result;
use crate::local::{LocalStats, LocalStore};

// == Local Tier ==
/// Capacity-bounded in-process cache with LRU eviction and read-time TTL.
#[derive(Debug)]
pub struct LocalTier {
    store: Mutex<LocalStore>,
}

impl LocalTier {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            store: Mutex::new(LocalStore::new(max_entries, ttl)),
        }
    }

    /// Inserts or overwrites an entry, stamping it with the current time.
    pub fn put(&self, key: &str, payload: Vec<u8>) -> Result<()> {
        self.store.lock().put(key, payload)
    }

    /// Returns a fresh payload, or `NotFound` / `Expired`.
    pub fn get(&self, key: &str) -> Result<Vec<u8>> {
        let result = self.store.lock().get(key);
        if result.is_ok() {
            trace!(key, "local tier hit");
        }
        result
    }

    pub fn remove(&self, key: &str) {
        self.store.lock().remove(key);
    }

    /// Whether an entry is resident, ignoring its TTL.
    pub fn contains(&self, key: &str) -> bool {
        self.store.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.store.lock().ttl()
    }

    pub fn stats(&self) -> LocalStats {
        self.store.lock().stats()
    }
}
