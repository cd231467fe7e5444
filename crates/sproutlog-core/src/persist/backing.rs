//! The durable key/value contract and its two stock implementations.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::StoreError;

/// An opaque, synchronous key/value persistence facility.
///
/// Keys are stable string identifiers (see [`super::keys`]). Implementations
/// must be safe for concurrent independent-key access; the write scheduler
/// issues per-key writes concurrently within one flush.
pub trait BackingStore: Send + Sync + 'static {
    /// Returns `None` for a key that has never been written.
    fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
    /// Removing an absent key is a no-op.
    fn remove_bytes(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-local store, primarily for tests and previews.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        lock_entries(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_entries(
    entries: &Mutex<HashMap<String, Vec<u8>>>,
) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
    entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl BackingStore for MemoryStore {
    fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(lock_entries(&self.entries).get(key).cloned())
    }

    fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        lock_entries(&self.entries).insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove_bytes(&self, key: &str) -> Result<(), StoreError> {
        lock_entries(&self.entries).remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a caller-chosen directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates the directory if needed.
    pub fn new(dir: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl BackingStore for FileStore {
    fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match std::fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        std::fs::write(self.path(key), bytes).map_err(|source| StoreError::Io {
            key: key.to_string(),
            source,
        })
    }

    fn remove_bytes(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
