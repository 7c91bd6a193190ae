//! Browser-backed key-value storage tiers.

use crate::dom;
use nexora_views::{KeyValueStore, StorageError};
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// `KeyValueStore` over a browser `Storage` handle (`localStorage` or
/// `sessionStorage`).
pub struct BrowserStorage {
    storage: Storage,
}

impl BrowserStorage {
    /// The persistent tier.
    ///
    /// # Errors
    /// Returns an error if `localStorage` is disabled or unavailable.
    pub fn local() -> Result<Self, StorageError> {
        dom::local_storage()
            .map(|storage| Self { storage })
            .map_err(storage_err)
    }

    /// The session tier.
    ///
    /// # Errors
    /// Returns an error if `sessionStorage` is disabled or unavailable.
    pub fn session() -> Result<Self, StorageError> {
        dom::session_storage()
            .map(|storage| Self { storage })
            .map_err(storage_err)
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(storage_err)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(key, value).map_err(storage_err)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage.remove_item(key).map_err(storage_err)
    }
}

fn storage_err(value: JsValue) -> StorageError {
    StorageError::new(dom::js_error_message(&value))
}
