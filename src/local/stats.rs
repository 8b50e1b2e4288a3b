//! Local Tier Statistics
//!
//! Tracks local tier hits, misses, read-time expirations and evictions.

use serde::Serialize;

// == Local Stats ==
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocalStats {
    /// Reads that returned a fresh entry
    pub hits: u64,
    /// Reads that found nothing
    pub misses: u64,
    /// Reads that found a resident entry past its TTL
    pub expired: u64,
    /// Entries evicted by capacity pressure
    pub evictions: u64,
    /// Current number of resident entries, expired ones included
    pub total_entries: usize,
}

impl LocalStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses + expired), or 0.0 with no reads.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.expired;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expired(&mut self) {
        self.expired += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
