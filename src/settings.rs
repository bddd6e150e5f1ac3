//! Player settings and preferences
//!
//! Persisted through the [`Store`] collaborator, one key per value.

use serde::{Deserialize, Serialize};

use crate::persistence::{Store, StoredValue, keys, load_or_warn, save_or_warn};
use crate::sim::MAX_PARTICLES;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => MAX_PARTICLES / 4,
            QualityPreset::Medium => MAX_PARTICLES,
            QualityPreset::High => MAX_PARTICLES * 2,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Particle effects (death bursts, sparks, etc.)
    pub particles: bool,
    /// All sound off
    pub muted: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,
            muted: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Load persisted values; anything missing or unreadable keeps its default
    pub fn load(store: &dyn Store) -> Self {
        let mut settings = Self::default();
        if let Some(muted) = load_or_warn(store, keys::MUTED).and_then(|v| v.as_bool()) {
            settings.muted = muted;
        }
        if let Some(quality) = load_or_warn(store, keys::QUALITY)
            .as_ref()
            .and_then(|v| v.as_str())
            .and_then(QualityPreset::from_str)
        {
            settings.quality = quality;
        }
        if let Some(particles) = load_or_warn(store, keys::PARTICLES).and_then(|v| v.as_bool()) {
            settings.particles = particles;
        }
        if let Some(vol) = load_volume(store, keys::MASTER_VOLUME) {
            settings.master_volume = vol;
        }
        if let Some(vol) = load_volume(store, keys::SFX_VOLUME) {
            settings.sfx_volume = vol;
        }
        log::info!(
            "Settings: quality {}, muted {}",
            settings.quality.as_str(),
            settings.muted
        );
        settings
    }

    pub fn save(&self, store: &mut dyn Store) {
        save_or_warn(store, keys::MUTED, StoredValue::Bool(self.muted));
        save_or_warn(
            store,
            keys::QUALITY,
            StoredValue::Text(self.quality.as_str().to_string()),
        );
        save_or_warn(store, keys::PARTICLES, StoredValue::Bool(self.particles));
        save_or_warn(
            store,
            keys::MASTER_VOLUME,
            StoredValue::Float(self.master_volume as f64),
        );
        save_or_warn(
            store,
            keys::SFX_VOLUME,
            StoredValue::Float(self.sfx_volume as f64),
        );
    }
}

/// A stored volume, clamped to [0, 1]; non-numbers and NaN are ignored
fn load_volume(store: &dyn Store, key: &str) -> Option<f32> {
    load_or_warn(store, key)
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite())
        .map(|v| (v as f32).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::persistence::testing::BrokenStore;

    #[test]
    fn test_particle_cap_follows_preset() {
        assert_eq!(Settings::default().max_particles(), MAX_PARTICLES);
        assert!(Settings::from_preset(QualityPreset::Low).max_particles() < MAX_PARTICLES);
        let off = Settings {
            particles: false,
            ..Settings::default()
        };
        assert_eq!(off.max_particles(), 0);
    }

    #[test]
    fn test_round_trip_through_store() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            muted: true,
            quality: QualityPreset::High,
            particles: false,
            master_volume: 0.25,
            sfx_volume: 0.5,
        };
        settings.save(&mut store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_broken_store_gives_defaults() {
        let store = BrokenStore::default();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_stored_volumes_are_clamped() {
        let mut store = MemoryStore::new();
        store.save(keys::MASTER_VOLUME, StoredValue::Float(3.0)).unwrap();
        store.save(keys::SFX_VOLUME, StoredValue::Int(-1)).unwrap();
        let settings = Settings::load(&store);
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.sfx_volume, 0.0);
    }

    #[test]
    fn test_wrong_types_are_ignored() {
        let mut store = MemoryStore::new();
        store.save(keys::MUTED, StoredValue::Int(1)).unwrap();
        store
            .save(keys::QUALITY, StoredValue::Text("ultra".into()))
            .unwrap();
        store
            .save(keys::SFX_VOLUME, StoredValue::Text("loud".into()))
            .unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }
}
