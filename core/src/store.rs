//! Persisted key-value store holding the active checkout id.
//!
//! # Design
//! The client only needs `get_item`/`set_item`. `MemoryStore` is a cloneable
//! handle over shared state, so every clone sees the same entries the way a
//! process-wide store would. `JsonFileStore` keeps the entries in a JSON
//! object on disk and survives restarts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::warn;

/// Errors raised while persisting a value.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store is not a valid JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Minimal persisted string map.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store; clones share entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a JSON object file. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the new contents are written to before being renamed
    /// over `path`.
    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }

    fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        match self.load() {
            Ok(mut entries) => entries.remove(key),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to read store");
                None
            }
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        let staging = self.staging_path();
        std::fs::write(&staging, serde_json::to_vec_pretty(&entries)?)?;
        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "checkout-core-{}-{name}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        assert_eq!(store.get_item("cj_ckId"), None);
        other.set_item("cj_ckId", "abc").unwrap();
        assert_eq!(store.get_item("cj_ckId").as_deref(), Some("abc"));
    }

    #[test]
    fn memory_store_overwrites() {
        let store = MemoryStore::new();
        store.set_item("k", "1").unwrap();
        store.set_item("k", "2").unwrap();
        assert_eq!(store.get_item("k").as_deref(), Some("2"));
    }

    #[test]
    fn file_store_missing_file_is_empty() {
        let store = JsonFileStore::new(temp_path("missing"));
        assert_eq!(store.get_item("cj_ckId"), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let path = temp_path("persist");
        JsonFileStore::new(&path).set_item("cj_ckId", "abc").unwrap();
        JsonFileStore::new(&path).set_item("other", "x").unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get_item("cj_ckId").as_deref(), Some("abc"));
        assert_eq!(reopened.get_item("other").as_deref(), Some("x"));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn file_store_failed_write_keeps_previous_contents() {
        let path = temp_path("failed-write");
        let store = JsonFileStore::new(&path);
        assert_eq!(store.path(), path.as_path());
        let _ = std::fs::remove_dir_all(store.staging_path());
        store.set_item("cj_ckId", "abc").unwrap();

        // a directory in the staging slot makes the next write fail
        let staging = store.staging_path();
        std::fs::create_dir_all(&staging).unwrap();
        assert!(matches!(store.set_item("cj_ckId", "def"), Err(StoreError::Io(_))));
        assert_eq!(store.get_item("cj_ckId").as_deref(), Some("abc"));

        std::fs::remove_dir_all(staging).unwrap();
        store.set_item("cj_ckId", "def").unwrap();
        assert_eq!(store.get_item("cj_ckId").as_deref(), Some("def"));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn file_store_corrupt_file_reads_as_absent_and_refuses_writes() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert_eq!(store.get_item("cj_ckId"), None);
        assert!(matches!(store.set_item("cj_ckId", "abc"), Err(StoreError::Json(_))));
        let _ = std::fs::remove_file(path);
    }
}
