//! Serializer for collection blobs.
//!
//! JSON keeps the encoding self-describing: field names travel with the
//! data, so a blob decodes without any external schema. Errors carry the
//! backing-store key so the caller can log which collection was affected.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

pub(crate) fn encode<T: Serialize>(key: &str, value: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })
}

pub(crate) fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|source| StoreError::Decode {
        key: key.to_string(),
        source,
    })
}

// ============================================================================
// Tests
// ============================================================================
