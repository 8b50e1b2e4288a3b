//! Cache-Aside Module
//!
//! The orchestrator tying both tiers together. Every read operation is a thin
//! wrapper over one `memoize` routine:
//!
//! 1. fingerprint the key and prefix it with the operation's [`Variant`];
//! 2. a fresh local tier entry answers immediately;
//! 3. otherwise the remote tier is asked, under the configured deadline;
//! 4. on a remote miss the handler runs and its result is written to both tiers;
//! 5. on a remote failure the handler runs but nothing is written back.
//!
//! Concurrent misses on one key are not coalesced: each caller runs its own
//! handler and the last write wins.

mod stats;
mod variant;

use std::future::Future;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::codec::{Codec, JsonCodec};
use crate::config::{Config, Settings};
use crate::error::{BoxError, CacheError, Result};
use crate::fingerprint::fingerprint;
use crate::local::{LocalStats, LocalTier};
use crate::remote::{RedisStore, RemoteStore};

use self::stats::AsideCounters;
pub use self::stats::AsideStats;
pub use self::variant::Variant;

// == Tiered Cache ==
/// Two-tier read-through cache over a [`RemoteStore`], generic over the
/// payload [`Codec`].
pub struct TieredCache<R, C = JsonCodec> {
    remote: R,
    local: Option<LocalTier>,
    codec: C,
    timeout: Duration,
    ttl: Duration,
    counters: AsideCounters,
}

impl TieredCache<RedisStore, JsonCodec> {
    /// Connects to Redis with JSON payloads.
    ///
    /// Fails only on invalid configuration. An unreachable server is logged
    /// and the cache is returned anyway; calls fail or degrade until it is back.
    pub async fn connect(config: &Config) -> Result<Self> {
        Self::connect_with_codec(config, JsonCodec).await
    }
}

impl<C: Codec> TieredCache<RedisStore, C> {
    pub async fn connect_with_codec(config: &Config, codec: C) -> Result<Self> {
        let settings = config.resolve()?;
        let remote = RedisStore::from_config(config)?;
        let cache = Self::new(remote, codec, settings);

        if cache.probe().await {
            info!(
                addr = %config.addr,
                db = config.db,
                codec = cache.codec.name(),
                "connected to remote tier"
            );
        }
        Ok(cache)
    }
}

impl<R: RemoteStore, C: Codec> TieredCache<R, C> {
    // == Constructor ==
    pub fn new(remote: R, codec: C, settings: Settings) -> Self {
        let local = settings
            .local_enabled
            .then(|| LocalTier::new(settings.local_max_entries, settings.local_ttl));

        Self {
            remote,
            local,
            codec,
            timeout: settings.timeout,
            ttl: settings.ttl,
            counters: AsideCounters::default(),
        }
    }

    /// Pings the remote tier; a failure is logged and reported as `false`.
    pub async fn probe(&self) -> bool {
        match self.remote_call(self.remote.ping()).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "remote tier probe failed");
                false
            }
        }
    }

    pub fn fingerprint<K: Serialize + ?Sized>(&self, key: &K) -> Result<String> {
        fingerprint(key)
    }

    // == Set ==
    /// Stores a payload under `key` for the given variant in both tiers.
    ///
    /// The local write is best-effort; a remote failure is returned.
    pub async fn set<K, V>(&self, variant: Variant, key: &K, payload: &V) -> Result<()>
    where
        K: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        let logical_key = variant.logical_key(&fingerprint(key)?);
        let bytes = self.codec.encode(payload)?;
        self.write_through(&logical_key, bytes).await
    }

    // == Lookup ==
    /// Reads a cached value without computing it.
    ///
    /// Returns [`CacheError::NotFound`] when neither tier holds the key.
    /// Remote failures are returned as-is since there is no fallback.
    pub async fn lookup<K, T>(&self, variant: Variant, key: &K) -> Result<T>
    where
        K: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let logical_key = variant.logical_key(&fingerprint(key)?);

        if let Some(bytes) = self.local_get(&logical_key) {
            self.counters.local_hit();
            return self.codec.decode(&bytes);
        }

        match self.remote_call(self.remote.get(&logical_key)).await? {
            Some(bytes) => {
                self.counters.remote_hit();
                self.codec.decode(&bytes)
            }
            None => Err(CacheError::NotFound(logical_key)),
        }
    }

    /// Reads a raw payload stored with [`Variant::Raw`].
    pub async fn parse_data<K, T>(&self, key: &K) -> Result<T>
    where
        K: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.lookup(Variant::Raw, key).await
    }

    // == Read-or-compute operations ==
    /// Raw payload, computed by `handler` on a miss.
    pub async fn get_or_store<K, T, F, Fut, E>(&self, key: &K, handler: F) -> Result<T>
    where
        K: Serialize + ?Sized,
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<BoxError>,
    {
        self.memoize(Variant::Raw, key, handler).await
    }

    pub async fn list<K, T, F, Fut, E>(&self, key: &K, handler: F) -> Result<Vec<T>>
    where
        K: Serialize + ?Sized,
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Vec<T>, E>>,
        E: Into<BoxError>,
    {
        self.memoize(Variant::List, key, handler).await
    }

    pub async fn count<K, F, Fut, E>(&self, key: &K, handler: F) -> Result<i64>
    where
        K: Serialize + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<i64, E>>,
        E: Into<BoxError>,
    {
        self.memoize(Variant::Count, key, handler).await
    }

    pub async fn compute_int<K, F, Fut, E>(&self, key: &K, handler: F) -> Result<i64>
    where
        K: Serialize + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<i64, E>>,
        E: Into<BoxError>,
    {
        self.memoize(Variant::ComputedInt, key, handler).await
    }

    // == Expire ==
    /// Drops every variant cached for `key` from both tiers.
    pub async fn expire<K: Serialize + ?Sized>(&self, key: &K) -> Result<()> {
        let fp = fingerprint(key)?;
        let keys: Vec<String> = Variant::ALL.iter().map(|v| v.logical_key(&fp)).collect();

        if let Some(local) = &self.local {
            for logical_key in &keys {
                local.remove(logical_key);
            }
        }
        self.remote_call(self.remote.delete(&keys)).await?;
        debug!(fingerprint = %fp, "expired all variants");
        Ok(())
    }

    // == Accessors ==
    pub fn stats(&self) -> AsideStats {
        self.counters.snapshot()
    }

    pub fn local_stats(&self) -> Option<LocalStats> {
        self.local.as_ref().map(LocalTier::stats)
    }

    pub fn local(&self) -> Option<&LocalTier> {
        self.local.as_ref()
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // == Internals ==
    async fn memoize<K, T, F, Fut, E>(&self, variant: Variant, key: &K, handler: F) -> Result<T>
    where
        K: Serialize + ?Sized,
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<BoxError>,
    {
        let logical_key = variant.logical_key(&fingerprint(key)?);

        if let Some(bytes) = self.local_get(&logical_key) {
            self.counters.local_hit();
            return self.codec.decode(&bytes);
        }

        match self.remote_call(self.remote.get(&logical_key)).await {
            Ok(Some(bytes)) => {
                self.counters.remote_hit();
                self.codec.decode(&bytes)
            }
            Ok(None) => {
                let value = self.run_handler(handler).await?;
                let bytes = self.codec.encode(&value)?;
                self.write_through(&logical_key, bytes).await?;
                Ok(value)
            }
            Err(err) => {
                warn!(
                    key = %logical_key,
                    variant = %variant,
                    codec = self.codec.name(),
                    error = %err,
                    "remote tier read failed, computing without write-back"
                );
                self.counters.degraded_read();
                self.run_handler(handler).await
            }
        }
    }

    async fn run_handler<T, F, Fut, E>(&self, handler: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<BoxError>,
    {
        self.counters.handler_call();
        handler().await.map_err(|e| CacheError::Handler(e.into()))
    }

    /// Local tier read; every failure, expiry included, counts as a miss.
    fn local_get(&self, logical_key: &str) -> Option<Vec<u8>> {
        self.local.as_ref()?.get(logical_key).ok()
    }

    async fn write_through(&self, logical_key: &str, bytes: Vec<u8>) -> Result<()> {
        if let Some(local) = &self.local {
            if let Err(err) = local.put(logical_key, bytes.clone()) {
                // A rejected write must not leave the previous value readable
                local.remove(logical_key);
                warn!(key = %logical_key, error = %err, "local tier write skipped");
                self.counters.local_write_failure();
            }
        }
        self.remote_call(self.remote.set(logical_key, &bytes, self.ttl))
            .await
    }

    async fn remote_call<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout(self.timeout)),
        }
    }
}
