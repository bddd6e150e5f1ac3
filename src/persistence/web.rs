//! Browser LocalStorage store (wasm32 only)

use web_sys::Storage;

use super::{Store, StoreError, StoredValue};

/// Keys are namespaced so several games can share an origin
const KEY_PREFIX: &str = "flappy_dragon.";

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Result<Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| StoreError::Unavailable("LocalStorage not available".to_string()))
    }
}

impl Store for LocalStorageStore {
    fn load(&self, key: &str) -> Result<Option<StoredValue>, StoreError> {
        let storage = Self::storage()?;
        let item = storage
            .get_item(&format!("{KEY_PREFIX}{key}"))
            .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))?;
        match item {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, key: &str, value: StoredValue) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        let json = serde_json::to_string(&value)?;
        storage
            .set_item(&format!("{KEY_PREFIX}{key}"), &json)
            .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))
    }
}
