//! Remote Tier Module
//!
//! The shared out-of-process store behind the local tier. Entries expire on
//! the store's own clock; deadlines are applied by the caller.

mod memory;
mod redis_store;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

pub use self::memory::{CallCounts, Fault, MemoryStore};
pub use self::redis_store::RedisStore;

/// Minimal key-value capability required from the remote store.
///
/// A missing key is `Ok(None)`, never an error. Errors are transport
/// failures: [`CacheError::Unavailable`](crate::CacheError::Unavailable) or
/// [`CacheError::Timeout`](crate::CacheError::Timeout).
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;

    /// Deletes every key in one round trip. Missing keys are ignored.
    async fn delete(&self, keys: &[String]) -> Result<()>;

    async fn ping(&self) -> Result<()>;
}
