//! Key-value persistence backends.
//!
//! Two implementations of [`KeyValueStore`]:
//! - [`MemoryStore`] keeps everything in process memory.
//! - [`JsonFileStore`] keeps a single JSON document on disk and rewrites the
//!   whole file on every mutation. Writes are not atomic.

use bilirq_core::error::StorageError;
use bilirq_core::traits::KeyValueStore;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Key-value store persisted as one JSON object on disk.
///
/// The file is read once when the store is opened; afterwards the in-memory
/// copy is authoritative and is written back after each `set` or `remove`.
/// A mutation whose write fails is rolled back, so memory never holds a
/// value the file does not.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| io_error("read", &path, &e))?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents).map_err(StorageError::deserialization)?
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = entries.len(), "Opened key-value file");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let contents =
            serde_json::to_string_pretty(entries).map_err(StorageError::serialization)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| io_error("create_dir", parent, &e))?;
        }
        fs::write(&self.path, contents).map_err(|e| io_error("write", &self.path, &e))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut entries = self.entries.write();
        let previous = entries.insert(key.to_string(), value);
        self.persist(&entries).inspect_err(|_| match previous {
            Some(old) => {
                entries.insert(key.to_string(), old);
            }
            None => {
                entries.remove(key);
            }
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write();
        let Some(previous) = entries.remove(key) else {
            return Ok(());
        };
        self.persist(&entries).inspect_err(|_| {
            entries.insert(key.to_string(), previous);
        })
    }
}

fn io_error(operation: &str, path: &Path, error: &std::io::Error) -> StorageError {
    StorageError::IoError {
        operation: operation.to_string(),
        path: path.display().to_string(),
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("token", "abc".to_string()).unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("abc"));

        store.set("token", "def".to_string()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("token").unwrap().as_deref(), Some("def"));

        store.remove("token").unwrap();
        store.remove("token").unwrap();
        assert!(store.get("token").unwrap().is_none());
    }

    #[test]
    fn test_json_file_store_persists_across_opens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.get("token").unwrap().is_none());
        store.set("token", "{\"mid\":1}".to_string()).unwrap();
        store.set("SavedCookie", "[]".to_string()).unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("token").unwrap().as_deref(),
            Some("{\"mid\":1}")
        );
        assert_eq!(reopened.get("SavedCookie").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_json_file_store_remove() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set("a", "1".to_string()).unwrap();
        store.remove("a").unwrap();
        store.remove("missing").unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert!(reopened.get("a").unwrap().is_none());
    }

    #[test]
    fn test_json_file_store_rejects_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let result = JsonFileStore::open(&path);
        assert!(matches!(
            result,
            Err(StorageError::DeserializationError { .. })
        ));
    }

    #[test]
    fn test_json_file_store_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.get("anything").unwrap().is_none());
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set("token", "old".to_string()).unwrap();
        store.set("SavedCookie", "[]".to_string()).unwrap();

        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        assert!(matches!(
            store.set("token", "new".to_string()),
            Err(StorageError::IoError { .. })
        ));
        assert!(store.set("fresh", "1".to_string()).is_err());
        assert!(store.remove("SavedCookie").is_err());

        assert_eq!(store.get("token").unwrap().as_deref(), Some("old"));
        assert!(store.get("fresh").unwrap().is_none());
        assert_eq!(store.get("SavedCookie").unwrap().as_deref(), Some("[]"));
    }
}
