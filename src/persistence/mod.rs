//! Key/value persistence for durable values
//!
//! Backends:
//! - `MemoryStore`: in-process map (tests, headless runs)
//! - `JsonFileStore`: one JSON object on disk (native)
//! - `LocalStore`: browser LocalStorage (wasm32)

#[cfg(not(target_arch = "wasm32"))]
use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::error::ArcadeError;

/// String slots addressed by key, in the shape of `window.localStorage`
pub trait KeyValueStore {
    /// Read a slot; `Ok(None)` when the key has never been written
    fn get_item(&self, key: &str) -> Result<Option<String>, ArcadeError>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), ArcadeError>;

    fn remove_item(&mut self, key: &str) -> Result<(), ArcadeError>;
}

/// Volatile store backed by a `HashMap`
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, ArcadeError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), ArcadeError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), ArcadeError> {
        self.items.remove(key);
        Ok(())
    }
}

/// Store persisted as a single JSON object file
///
/// The whole file is rewritten on every change. A missing file reads as empty.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct JsonFileStore {
    path: std::path::PathBuf,
    items: BTreeMap<String, String>,
}

#[cfg(not(target_arch = "wasm32"))]
impl JsonFileStore {
    /// Open (or lazily create) the store at `path`
    pub fn open(path: impl Into<std::path::PathBuf>) -> Result<Self, ArcadeError> {
        let path = path.into();
        let items: BTreeMap<String, String> = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        log::debug!("Opened store {} ({} items)", path.display(), items.len());
        Ok(Self { path, items })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn flush(&self) -> Result<(), ArcadeError> {
        let json = serde_json::to_string_pretty(&self.items)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for JsonFileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, ArcadeError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), ArcadeError> {
        self.items.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove_item(&mut self, key: &str) -> Result<(), ArcadeError> {
        if self.items.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    /// Fails when LocalStorage is disabled or the window is gone
    pub fn open() -> Result<Self, ArcadeError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .map(|storage| Self { storage })
            .ok_or(ArcadeError::StorageUnavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, ArcadeError> {
        self.storage
            .get_item(key)
            .map_err(|_| ArcadeError::StorageUnavailable)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), ArcadeError> {
        self.storage
            .set_item(key, value)
            .map_err(|_| ArcadeError::StorageUnavailable)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), ArcadeError> {
        self.storage
            .remove_item(key)
            .map_err(|_| ArcadeError::StorageUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get_item("a").unwrap(), None);

        store.set_item("a", "1").unwrap();
        store.set_item("a", "2").unwrap();
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 1);

        store.remove_item("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let path = std::env::temp_dir().join(format!(
            "arcade_sim_store_test_{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        {
            let mut store = JsonFileStore::open(&path).unwrap();
            assert_eq!(store.get_item("best").unwrap(), None);
            store.set_item("best", "120").unwrap();
        }

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get_item("best").unwrap().as_deref(), Some("120"));
        store.remove_item("best").unwrap();
        assert_eq!(store.get_item("best").unwrap(), None);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let path = std::env::temp_dir().join(format!(
            "arcade_sim_store_garbage_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "not json").unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, ArcadeError::Serialization(_)));

        let _ = std::fs::remove_file(&path);
    }
}
