//! Key-Value Persistence Substrate
//!
//! Everything durable (level progress, medal counters, coin balance) is a
//! keyed byte blob behind [`KeyValueStore`]. Engines receive the store as an
//! `Arc<dyn KeyValueStore>` so tests can run against [`MemoryStore`].

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use thiserror::Error;

/// Shared handle to a store.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key contains characters that cannot be used as a file name.
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    /// A previous writer panicked while holding the lock.
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Minimal byte-oriented key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read the blob stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the blob stored under `key`.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-process store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap into a shared handle.
    pub fn shared(&self) -> SharedStore {
        Arc::new(self.clone())
    }

    /// Number of keys present.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// True when no key has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// One file per key under a root directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.blob")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        // Write-then-rename so a crash never leaves a torn blob
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
