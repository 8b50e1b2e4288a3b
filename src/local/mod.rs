//! Local Tier Module
//!
//! Provides the in-process cache tier with read-time TTL and LRU eviction.

mod entry;
mod lru;
mod stats;
mod store;
mod tier;


pub use entry::LocalEntry;
pub use lru::LruTracker;
pub use stats::LocalStats;
pub use store::LocalStore;
pub use tier::LocalTier;

// == Public Constants ==
/// Maximum allowed logical key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed payload size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
