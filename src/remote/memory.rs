//! In-process remote store.
//!
//! Behaves like the shared store (store-managed TTL, batch delete) without a
//! network, and can be told to fail or stall so degraded paths are testable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use super::RemoteStore;
use crate::error::{CacheError, Result};

/// Failure mode applied to every call until cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Calls fail immediately as if the connection was refused
    Unavailable,
    /// Calls sleep for the given duration before answering
    Stall(Duration),
}

#[derive(Debug)]
struct StoredValue {
    bytes: Vec<u8>,
    expires_at: Instant,
}

/// Per-operation call counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub gets: u64,
    pub sets: u64,
    pub deletes: u64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, StoredValue>>,
    fault: Mutex<Option<Fault>>,
    gets: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject(&self, fault: Fault) {
        *self.fault.lock() = Some(fault);
    }

    pub fn clear_fault(&self) {
        *self.fault.lock() = None;
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            gets: self.gets.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
        }
    }

    /// Number of live (unexpired) keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.values
            .lock()
            .values()
            .filter(|v| v.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn apply_fault(&self) -> Result<()> {
        let fault = *self.fault.lock();
        match fault {
            None => Ok(()),
            Some(Fault::Unavailable) => Err(CacheError::Unavailable("connection refused".into())),
            Some(Fault::Stall(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::Relaxed);
        self.apply_fault().await?;

        let mut values = self.values.lock();
        match values.get(key) {
            Some(v) if v.expires_at > Instant::now() => Ok(Some(v.bytes.clone())),
            Some(_) => {
                values.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        self.sets.fetch_add(1, Ordering::Relaxed);
        self.apply_fault().await?;

        self.values.lock().insert(
            key.to_string(),
            StoredValue {
                bytes: value.to_vec(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::Relaxed);
        self.apply_fault().await?;

        let mut values = self.values.lock();
        for key in keys {
            values.remove(key);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.apply_fault().await
    }
}
