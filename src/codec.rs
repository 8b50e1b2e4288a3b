//! Codec Module
//!
//! Payload serialization used by both tiers. The orchestrator is generic over
//! a [`Codec`], so the textual and binary encodings are interchangeable.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{CacheError, Result};

/// Encodes payloads to bytes and back.
pub trait Codec: Send + Sync {
    /// Short name used in log fields.
    fn name(&self) -> &'static str;

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

// == JSON ==
/// Textual JSON encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| CacheError::Encoding(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| CacheError::Decode(e.to_string()))
    }
}

// == Bincode ==
/// Compact binary encoding. The layout is defined by the Rust type, so the
/// reader must decode into the same shape that was written.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl Codec for BincodeCodec {
    fn name(&self) -> &'static str {
        "bincode"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        bincode::serde::encode_to_vec(value, bincode::config::standard())
            .map_err(|e| CacheError::Encoding(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        let (value, read) =
            bincode::serde::decode_from_slice::<T, _>(bytes, bincode::config::standard())
                .map_err(|e| CacheError::Decode(e.to_string()))?;
        if read != bytes.len() {
            return Err(CacheError::Decode(format!(
                "{} trailing bytes after payload",
                bytes.len() - read
            )));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Partner {
        id: i64,
        name: String,
        phone: Option<String>,
    }

    fn partners() -> Vec<Partner> {
        vec![
            Partner {
                id: 1,
                name: "te1".into(),
                phone: None,
            },
            Partner {
                id: 4,
                name: "te4".into(),
                phone: Some("555".into()),
            },
        ]
    }

    #[test]
    fn test_json_roundtrip() {
        let bytes = JsonCodec.encode(&partners()).unwrap();
        assert!(bytes.starts_with(b"["));
        let decoded: Vec<Partner> = JsonCodec.decode(&bytes).unwrap();
        assert_eq!(decoded, partners());
    }

    #[test]
    fn test_bincode_roundtrip() {
        let bytes = BincodeCodec.encode(&partners()).unwrap();
        let decoded: Vec<Partner> = BincodeCodec.decode(&bytes).unwrap();
        assert_eq!(decoded, partners());
    }

    #[test]
    fn test_json_decode_wrong_shape() {
        let bytes = JsonCodec.encode(&42i64).unwrap();
        let result: Result<Vec<Partner>> = JsonCodec.decode(&bytes);
        assert!(matches!(result, Err(CacheError::Decode(_))));
    }

    #[test]
    fn test_bincode_rejects_trailing_bytes() {
        let mut bytes = BincodeCodec.encode(&7i64).unwrap();
        bytes.extend_from_slice(&[1, 2, 3]);
        let result: Result<i64> = BincodeCodec.decode(&bytes);
        assert!(matches!(result, Err(CacheError::Decode(_))));
    }

    #[test]
    fn test_json_encode_failure() {
        use std::collections::HashMap;
        // Non-string map keys cannot be JSON object keys
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1);
        let result = JsonCodec.encode(&map);
        assert!(matches!(result, Err(CacheError::Encoding(_))));
    }
}
