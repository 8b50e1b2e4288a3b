//! Local Entry Module
//!
//! Defines a single local tier entry stamped with its creation time.

use std::time::Duration;

use tokio::time::Instant;

// == Local Entry ==
/// An encoded payload held by the local tier.
///
/// Expiry is relative to the tier's TTL and is only checked on read; an
/// expired entry stays resident until it is evicted or removed.
#[derive(Debug, Clone)]
pub struct LocalEntry {
    /// Encoded payload bytes
    pub payload: Vec<u8>,
    /// When the entry was written
    pub created_at: Instant,
}

impl LocalEntry {
    // == Constructor ==
    /// Creates an entry stamped with the current time.
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            payload,
            created_at: Instant::now(),
        }
    }

    // == Age ==
    /// Time elapsed since the entry was written.
    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.created_at)
    }

    // == Is Expired ==
    /// Checks the entry against a TTL.
    ///
    /// Boundary condition: an entry whose age equals the TTL is still fresh;
    /// it expires once the age strictly exceeds the TTL.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }

    /// Remaining lifetime under a TTL, zero once expired.
    pub fn ttl_remaining(&self, ttl: Duration) -> Duration {
        ttl.saturating_sub(self.age())
    }
}
