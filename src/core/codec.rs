//! Blob Codec
//!
//! JSON encoding for persisted blobs, plus the load/save helpers that turn
//! store and decode failures into defaults (reads) or warnings (writes).

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::warn;

use super::store::KeyValueStore;

/// Codec errors.
#[derive(Debug, Error)]
pub enum CodecError {
    /// serde_json failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Decoded value had the wrong shape.
    #[error("Invalid shape: {0}")]
    Shape(String),
}

/// Serialize to JSON bytes.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(value)?)
}

/// Deserialize from JSON bytes.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Read and decode `key`.
///
/// Returns `None` when the key is absent, unreadable, or undecodable.
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let bytes = match store.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(e) => {
            warn!("Failed to read {}: {}", key, e);
            return None;
        }
    };

    match decode(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Discarding undecodable {}: {}", key, e);
            None
        }
    }
}

/// Encode and write `value` under `key`. Best-effort: failures are logged.
pub fn save<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let bytes = match encode(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Skipping save of {}: {}", key, e);
            return;
        }
    };

    if let Err(e) = store.set(key, &bytes) {
        warn!("Failed to save {}: {}", key, e);
    }
}
