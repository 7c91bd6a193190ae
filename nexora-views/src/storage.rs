//! Key-value storage seam.
//!
//! The engine never talks to `localStorage`/`sessionStorage` directly; it
//! goes through [`KeyValueStore`] so the game session flags work the same
//! headless as they do in a browser.

use crate::error::StorageError;
use std::collections::HashMap;

/// Minimal string key-value storage. Platform implementations back this with
/// `localStorage` or `sessionStorage`.
pub trait KeyValueStore {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage is unavailable.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage rejects the write
    /// (disabled, full, or unavailable).
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage is unavailable.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store, used by tests and headless embeddings.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    /// When set, every operation fails; lets tests exercise the degraded
    /// storage paths.
    pub fail: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail {
            return Err(StorageError::new("memory store disabled"));
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::new("memory store disabled"));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::new("memory store disabled"));
        }
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn failing_store_errors_on_every_operation() {
        let mut store = MemoryStore {
            fail: true,
            ..MemoryStore::new()
        };
        assert!(store.get("k").is_err());
        assert!(store.set("k", "v").is_err());
        assert!(store.remove("k").is_err());
    }
}
