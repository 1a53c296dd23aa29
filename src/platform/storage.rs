//! Key-value storage collaborators
//!
//! Every write replaces a single key's whole value, so readers never see a
//! partially written record.

use std::collections::BTreeMap;

use crate::error::StorageError;

/// Minimal persistent string store (LocalStorage semantics)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store, used natively and in tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    inner: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    /// Open the window's LocalStorage (fails in private mode / sandboxed frames)
    pub fn open() -> Result<Self, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .map(|inner| Self { inner })
            .ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner
            .get_item(key)
            .map_err(|_| StorageError::Unavailable)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner
            .set_item(key, value)
            .map_err(|e: wasm_bindgen::JsValue| StorageError::Write {
                key: key.to_owned(),
                reason: format!("{e:?}"),
            })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner
            .remove_item(key)
            .map_err(|_| StorageError::Unavailable)
    }
}

/// Store whose writes always fail (quota exceeded)
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FailingStore {
    pub reads: MemoryStore,
}

#[cfg(test)]
impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.reads.get(key)
    }

    fn set(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Write {
            key: key.to_owned(),
            reason: "QuotaExceededError".to_owned(),
        })
    }

    fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_replaces_whole_value() {
        let mut store = MemoryStore::new();
        store.set("arcade_snakeHighScore", "50").unwrap();
        store.set("arcade_snakeHighScore", "7").unwrap();
        assert_eq!(
            store.get("arcade_snakeHighScore").unwrap().as_deref(),
            Some("7")
        );
        assert_eq!(store.len(), 1);

        store.remove("arcade_snakeHighScore").unwrap();
        assert!(store.get("arcade_snakeHighScore").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_failing_store_rejects_writes() {
        let mut store = FailingStore::default();
        assert!(matches!(
            store.set("k", "v"),
            Err(StorageError::Write { .. })
        ));
        assert!(store.get("k").unwrap().is_none());
    }
}
