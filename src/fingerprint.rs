//! Fingerprint Module
//!
//! Derives a stable identifier from any serializable key.
//!
//! The key is first lowered into a `serde_json::Value` tree. Object keys in
//! that tree are kept in sorted order, so struct fields and map entries always
//! render the same bytes regardless of insertion order. The rendered bytes are
//! hashed with SHA-256 and the first 128 bits are hex encoded.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{CacheError, Result};

/// Number of digest bytes kept in a fingerprint.
const FINGERPRINT_BYTES: usize = 16;

/// Renders the canonical byte encoding of a key.
pub fn canonical_bytes<K: Serialize + ?Sized>(key: &K) -> Result<Vec<u8>> {
    let value = serde_json::to_value(key).map_err(|e| CacheError::Encoding(e.to_string()))?;
    serde_json::to_vec(&value).map_err(|e| CacheError::Encoding(e.to_string()))
}

/// Computes the fingerprint of a key: 32 lowercase hex characters.
pub fn fingerprint<K: Serialize + ?Sized>(key: &K) -> Result<String> {
    let bytes = canonical_bytes(key)?;
    let digest = Sha256::digest(&bytes);
    Ok(hex::encode(&digest.as_slice()[..FINGERPRINT_BYTES]))
}
