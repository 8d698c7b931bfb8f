//! Local durable storage
//!
//! A small key/value seam in front of whatever durable storage the host
//! offers. Values are JSON strings. Writes may be refused when the backing
//! store is full; callers decide how to degrade.

use crate::error::StorageError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Key/value storage that survives restarts
pub trait LocalStorage: Send + Sync {
    /// Read a value, `None` when absent or unreadable
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value; fails with [`StorageError::QuotaExceeded`] when full
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value; absent keys are ignored
    fn remove(&self, key: &str);
}

/// In-process storage with an optional byte quota
///
/// The quota counts the bytes of every stored value, the way a browser
/// counts its local storage budget.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create unbounded storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage that refuses writes beyond `bytes` in total
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota: Some(bytes),
        }
    }

    /// Bytes currently used by stored values
    pub fn used_bytes(&self) -> usize {
        self.entries.read().values().map(String::len).sum()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }
}

impl LocalStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write();
        if let Some(quota) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            if others + value.len() > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    bytes: value.len(),
                });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }
}

/// Storage as one JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    quota: Option<usize>,
}

impl FileStorage {
    /// Open (and create) a storage directory
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root, quota: None })
    }

    /// Refuse writes that would grow the directory beyond `bytes`
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.root.join(format!("{}.json", file))
    }

    fn used_bytes_except(&self, skip: &Path) -> io::Result<usize> {
        let mut total = 0;
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path == skip || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            total += entry.metadata()?.len() as usize;
        }
        Ok(total)
    }
}

impl LocalStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Failed to read storage key {}: {}", key, e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let quota_error = || StorageError::QuotaExceeded {
            key: key.to_string(),
            bytes: value.len(),
        };

        if let Some(quota) = self.quota {
            if self.used_bytes_except(&path)? + value.len() > quota {
                return Err(quota_error());
            }
        }

        // Write beside the target and rename so a failed write never leaves half a value
        let tmp = path.with_extension("json.tmp");
        let written = std::fs::write(&tmp, value).and_then(|_| std::fs::rename(&tmp, &path));
        match written {
            Ok(()) => Ok(()),
            Err(e) => {
                let _ = std::fs::remove_file(&tmp);
                match e.kind() {
                    io::ErrorKind::StorageFull | io::ErrorKind::QuotaExceeded => Err(quota_error()),
                    _ => Err(StorageError::Io(e)),
                }
            }
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = std::fs::remove_file(self.path_for(key)) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove storage key {}: {}", key, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k"), None);
        storage.set("k", "[1,2]").unwrap();
        assert_eq!(storage.get("k").as_deref(), Some("[1,2]"));
        storage.remove("k");
        storage.remove("k");
        assert!(!storage.contains("k"));
    }

    #[test]
    fn test_memory_quota_counts_other_keys() {
        let storage = MemoryStorage::with_quota(10);
        storage.set("a", "123456").unwrap();
        let err = storage.set("b", "12345").unwrap_err();
        assert!(err.is_quota());

        // replacing a key frees its old bytes first
        storage.set("a", "1234567890").unwrap();
        assert_eq!(storage.used_bytes(), 10);
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        storage.set("cnc_bits_cache", "[]").unwrap();
        assert_eq!(storage.get("cnc_bits_cache").as_deref(), Some("[]"));
        assert!(dir.path().join("cnc_bits_cache.json").exists());

        storage.remove("cnc_bits_cache");
        assert_eq!(storage.get("cnc_bits_cache"), None);
        storage.remove("cnc_bits_cache");
    }

    #[test]
    fn test_file_storage_quota() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap().with_quota(8);

        storage.set("a", "12345").unwrap();
        assert!(storage.set("b", "12345").unwrap_err().is_quota());
        storage.set("a", "12345678").unwrap();
        assert_eq!(storage.get("b"), None);
    }

    #[test]
    fn test_file_storage_sanitizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        storage.set("../escape", "1").unwrap();
        assert!(dir.path().join("___escape.json").exists());
    }
}
