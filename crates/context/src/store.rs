//! Persisted key-value fallbacks (last active unit, outlet, organization).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Minimal string store, modelled on browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// Process-local store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is not a JSON object of strings: {0}")]
    Format(#[from] serde_json::Error),
}

/// JSON-file backed store; survives process restarts.
///
/// Every mutation rewrites the file. Write failures are logged and the
/// in-memory value still changes, so resolution never blocks on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    fn flush_or_log(&self) {
        if let Err(err) = self.flush() {
            tracing::warn!(path = %self.path.display(), %err, "failed to persist store");
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        if self.entries.get(key).map(String::as_str) == Some(value) {
            return;
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.flush_or_log();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.flush_or_log();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("opsdash-store-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        store.set("active-outlet-id", "out-1");
        assert_eq!(store.get("active-outlet-id").as_deref(), Some("out-1"));
        store.remove("active-outlet-id");
        assert_eq!(store.get("active-outlet-id"), None);
    }

    #[test]
    fn file_store_survives_reopen() {
        let path = temp_path("reopen");
        let _ = std::fs::remove_file(&path);

        let mut store = FileStore::open(&path).unwrap();
        store.set("active-business-unit", "acme-shop");
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("active-business-unit").as_deref(), Some("acme-shop"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn file_store_rejects_non_object_contents() {
        let path = temp_path("garbage");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let err = FileStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Format(_)));

        let _ = std::fs::remove_file(&path);
    }
}
