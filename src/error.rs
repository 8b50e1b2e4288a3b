//! Error types for the tiered cache
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use thiserror::Error;

/// Boxed error returned by caller-supplied handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// == Cache Error Enum ==
/// Unified error type for the tiered cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key or payload could not be serialized
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// Stored bytes could not be decoded into the requested type
    #[error("Decoding failed: {0}")]
    Decode(String),

    /// Key not found in any tier
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key is resident in the local tier but past its TTL
    #[error("Key expired: {0}")]
    Expired(String),

    /// Invalid request data (local tier size limits)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Remote store transport failure
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),

    /// Remote call exceeded its deadline
    #[error("Remote store timed out after {0:?}")]
    Timeout(Duration),

    /// The caller-supplied handler failed
    #[error("Handler failed: {0}")]
    Handler(#[source] BoxError),

    /// Invalid or incomplete configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CacheError {
    /// Returns true for remote transport failures (unavailable or timed out).
    pub fn is_transport(&self) -> bool {
        matches!(self, CacheError::Unavailable(_) | CacheError::Timeout(_))
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Unavailable(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the tiered cache.
pub type Result<T> = std::result::Result<T, CacheError>;
