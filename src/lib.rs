//! tiercache - A two-tier read-through cache
//!
//! A bounded in-process LRU tier in front of a shared Redis tier, with
//! compute-if-absent operations keyed by a fingerprint of any serializable
//! request.

pub mod aside;
pub mod codec;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod local;
pub mod remote;

pub use aside::{AsideStats, TieredCache, Variant};
pub use codec::{BincodeCodec, Codec, JsonCodec};
pub use config::{Config, Settings};
pub use error::{BoxError, CacheError, Result};
pub use fingerprint::fingerprint;
pub use local::{LocalStats, LocalTier};
pub use remote::{MemoryStore, RedisStore, RemoteStore};
