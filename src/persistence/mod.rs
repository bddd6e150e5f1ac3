//! Key/value persistence
//!
//! The game stores a handful of primitives (best score, mute flag, quality,
//! campaign progress). Where they live is up to the [`Store`] the host plugs
//! in. Failures never reach gameplay: callers log and fall back to defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::CampaignProgress;

pub mod file;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use file::JsonFileStore;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageStore;

/// Storage keys
pub mod keys {
    pub const BEST_SCORE: &str = "best_score";
    pub const MUTED: &str = "muted";
    pub const QUALITY: &str = "quality";
    pub const PARTICLES: &str = "particles";
    pub const MASTER_VOLUME: &str = "master_volume";
    pub const SFX_VOLUME: &str = "sfx_volume";
    pub const CAMPAIGN_PROGRESS: &str = "campaign_progress";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A primitive value as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl StoredValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StoredValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            StoredValue::Int(i) => Some(*i),
            StoredValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StoredValue::Int(i) => Some(*i as f64),
            StoredValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StoredValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Key → primitive storage collaborator
pub trait Store {
    fn load(&self, key: &str) -> Result<Option<StoredValue>, StoreError>;
    fn save(&mut self, key: &str, value: StoredValue) -> Result<(), StoreError>;
}

/// In-process store (tests, headless runs)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, StoredValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Store for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<StoredValue>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: StoredValue) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Load a key, logging and discarding any failure
pub fn load_or_warn(store: &dyn Store, key: &str) -> Option<StoredValue> {
    match store.load(key) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Failed to load '{}': {}", key, e);
            None
        }
    }
}

/// Save a key, logging and discarding any failure
pub fn save_or_warn(store: &mut dyn Store, key: &str, value: StoredValue) {
    if let Err(e) = store.save(key, value) {
        log::warn!("Failed to save '{}': {}", key, e);
    }
}

/// Meta-progression that outlives a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub best_score: u32,
    pub campaign: CampaignProgress,
}

impl Progress {
    pub fn load(store: &dyn Store) -> Self {
        let best_score = load_or_warn(store, keys::BEST_SCORE)
            .and_then(|v| v.as_i64())
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0);

        let campaign = load_or_warn(store, keys::CAMPAIGN_PROGRESS)
            .and_then(|v| v.as_str().map(str::to_string))
            .and_then(|json| match serde_json::from_str(&json) {
                Ok(progress) => Some(progress),
                Err(e) => {
                    log::warn!("Discarding unreadable campaign progress: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        Self {
            best_score,
            campaign,
        }
    }

    pub fn save(&self, store: &mut dyn Store) {
        save_or_warn(
            store,
            keys::BEST_SCORE,
            StoredValue::Int(i64::from(self.best_score)),
        );
        match serde_json::to_string(&self.campaign) {
            Ok(json) => save_or_warn(store, keys::CAMPAIGN_PROGRESS, StoredValue::Text(json)),
            Err(e) => log::warn!("Failed to encode campaign progress: {}", e),
        }
    }

    /// Returns true if `score` is a new best
    pub fn record_score(&mut self, score: u32) -> bool {
        if score > self.best_score {
            self.best_score = score;
            true
        } else {
            false
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::BrokenStore;
    use super::*;
    use crate::sim::MissionCatalog;

    #[test]
    fn test_stored_value_json_shape() {
        let values = vec![
            StoredValue::Bool(true),
            StoredValue::Int(42),
            StoredValue::Float(0.5),
            StoredValue::Text("hi".to_string()),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[true,42,0.5,"hi"]"#);
        let back: Vec<StoredValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(StoredValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(StoredValue::Float(7.0).as_i64(), Some(7));
        assert_eq!(StoredValue::Float(7.5).as_i64(), None);
        assert_eq!(StoredValue::Text("x".into()).as_bool(), None);
    }

    #[test]
    fn test_progress_round_trip_through_store() {
        let mut store = MemoryStore::new();
        let mut progress = Progress::default();
        assert!(progress.record_score(17));
        assert!(!progress.record_score(9));
        progress
            .campaign
            .record_completion(&MissionCatalog::builtin(), "ashen_gate");
        progress.save(&mut store);

        assert_eq!(Progress::load(&store), progress);
    }

    #[test]
    fn test_progress_survives_broken_store() {
        let mut store = BrokenStore::default();
        let progress = Progress::load(&store);
        assert_eq!(progress, Progress::default());
        progress.save(&mut store);
        assert_eq!(store.attempts.get(), 4);
    }

    #[test]
    fn test_garbage_values_fall_back() {
        let mut store = MemoryStore::new();
        store
            .save(keys::BEST_SCORE, StoredValue::Int(-5))
            .unwrap();
        store
            .save(keys::CAMPAIGN_PROGRESS, StoredValue::Text("{nope".into()))
            .unwrap();
        assert_eq!(Progress::load(&store), Progress::default());
    }
}
