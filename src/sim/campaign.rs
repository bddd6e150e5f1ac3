//! Campaign missions ("gates")
//!
//! A mission is plain data loaded from JSON. Before it touches the simulation
//! it is reduced to [`CampaignModifiers`], where every field has been checked:
//! bad numbers become neutral values, never zero or negative speeds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::weather::WeatherKind;
use crate::consts::{GAP_MAX, GAP_MIN, OBSTACLE_WIDTH};

/// Multipliers are floored here so a mission can never stall the world
pub const MIN_CAMPAIGN_MULTIPLIER: f32 = 0.35;
pub const MAX_CAMPAIGN_MULTIPLIER: f32 = 3.0;
/// Smallest gap a mission may request
pub const GAP_OVERRIDE_FLOOR: f32 = 110.0;
pub const SPACING_OVERRIDE_RANGE: (f32, f32) = (120.0, 480.0);

#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("mission catalog JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("mission catalog is empty")]
    Empty,
}

/// What the player must do to clear a mission
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Objective {
    Score { target: u32 },
    Kills { target: u32 },
    Survive { seconds: f32 },
    Shards { target: u32 },
}

/// Plain counters a run exposes for objective tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub score: u32,
    pub kills: u32,
    pub elapsed: f32,
    pub shards: u32,
}

impl Objective {
    /// Progress toward the target in [0, 1]
    pub fn progress(&self, stats: &RunStats) -> f32 {
        let (have, need) = match *self {
            Objective::Score { target } => (stats.score as f32, target as f32),
            Objective::Kills { target } => (stats.kills as f32, target as f32),
            Objective::Survive { seconds } => (stats.elapsed, seconds),
            Objective::Shards { target } => (stats.shards as f32, target as f32),
        };
        if !need.is_finite() || need <= 0.0 {
            return 1.0;
        }
        (have / need).clamp(0.0, 1.0)
    }

    pub fn is_met(&self, stats: &RunStats) -> bool {
        self.progress(stats) >= 1.0
    }
}

/// A mission as authored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub weather_bias: Option<String>,
    #[serde(default)]
    pub scroll_multiplier: Option<f32>,
    #[serde(default)]
    pub meteor_interval_multiplier: Option<f32>,
    #[serde(default)]
    pub fire_cooldown_multiplier: Option<f32>,
    #[serde(default)]
    pub gap_min: Option<f32>,
    #[serde(default)]
    pub spacing_min: Option<f32>,
    #[serde(default)]
    pub fog_overlay: Option<f32>,
    pub objective: Objective,
}

/// Sanitized per-run overrides. `None` means "no override".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CampaignModifiers {
    pub weather_bias: Option<WeatherKind>,
    pub scroll_multiplier: f32,
    pub hazard_interval_multiplier: f32,
    pub fire_cooldown_multiplier: f32,
    pub gap_min: Option<f32>,
    pub spacing_min: Option<f32>,
    pub fog_overlay: Option<f32>,
}

impl Default for CampaignModifiers {
    fn default() -> Self {
        Self {
            weather_bias: None,
            scroll_multiplier: 1.0,
            hazard_interval_multiplier: 1.0,
            fire_cooldown_multiplier: 1.0,
            gap_min: None,
            spacing_min: None,
            fog_overlay: None,
        }
    }
}

fn sanitize_multiplier(field: &str, value: Option<f32>) -> f32 {
    match value {
        None => 1.0,
        Some(v) if !v.is_finite() => {
            log::warn!("Mission field {} is not finite, using 1.0", field);
            1.0
        }
        Some(v) => {
            let clamped = v.clamp(MIN_CAMPAIGN_MULTIPLIER, MAX_CAMPAIGN_MULTIPLIER);
            if clamped != v {
                log::warn!("Mission field {} = {} clamped to {}", field, v, clamped);
            }
            clamped
        }
    }
}

fn sanitize_override(field: &str, value: Option<f32>, min: f32, max: f32) -> Option<f32> {
    let v = value?;
    if v.is_finite() && (min..=max).contains(&v) {
        Some(v)
    } else {
        log::warn!("Mission field {} = {} rejected", field, v);
        None
    }
}

impl CampaignModifiers {
    pub fn from_mission(mission: &Mission) -> Self {
        let weather_bias = mission.weather_bias.as_deref().and_then(|id| {
            let kind = WeatherKind::from_id(id);
            if kind.is_none() {
                log::warn!("Mission {} names unknown weather '{}'", mission.id, id);
            }
            kind
        });

        Self {
            weather_bias,
            scroll_multiplier: sanitize_multiplier("scroll_multiplier", mission.scroll_multiplier),
            hazard_interval_multiplier: sanitize_multiplier(
                "meteor_interval_multiplier",
                mission.meteor_interval_multiplier,
            ),
            fire_cooldown_multiplier: sanitize_multiplier(
                "fire_cooldown_multiplier",
                mission.fire_cooldown_multiplier,
            ),
            gap_min: sanitize_override("gap_min", mission.gap_min, GAP_OVERRIDE_FLOOR, GAP_MAX),
            spacing_min: sanitize_override(
                "spacing_min",
                mission.spacing_min,
                SPACING_OVERRIDE_RANGE.0.max(OBSTACLE_WIDTH),
                SPACING_OVERRIDE_RANGE.1,
            ),
            fog_overlay: sanitize_override("fog_overlay", mission.fog_overlay, 0.0, 1.0),
        }
    }

    /// Minimum gap the spawner should shrink toward
    pub fn effective_gap_min(&self) -> f32 {
        self.gap_min.unwrap_or(GAP_MIN)
    }
}

/// An ordered list of missions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionCatalog {
    pub missions: Vec<Mission>,
}

impl MissionCatalog {
    /// Parse a catalog: either `{"missions": [...]}` or a bare array
    pub fn from_json(json: &str) -> Result<Self, CampaignError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Wrapped(MissionCatalog),
            Bare(Vec<Mission>),
        }

        let catalog = match serde_json::from_str::<Shape>(json)? {
            Shape::Wrapped(catalog) => catalog,
            Shape::Bare(missions) => MissionCatalog { missions },
        };
        if catalog.missions.is_empty() {
            return Err(CampaignError::Empty);
        }
        Ok(catalog)
    }

    pub fn builtin() -> Self {
        Self {
            missions: vec![
                Mission {
                    id: "ashen_gate".to_string(),
                    name: "Ashen Gate".to_string(),
                    weather_bias: Some("ember_storm".to_string()),
                    scroll_multiplier: None,
                    meteor_interval_multiplier: Some(0.85),
                    fire_cooldown_multiplier: Some(0.8),
                    gap_min: None,
                    spacing_min: None,
                    fog_overlay: None,
                    objective: Objective::Kills { target: 12 },
                },
                Mission {
                    id: "mist_gate".to_string(),
                    name: "Mist Gate".to_string(),
                    weather_bias: Some("fog".to_string()),
                    scroll_multiplier: Some(0.9),
                    meteor_interval_multiplier: None,
                    fire_cooldown_multiplier: None,
                    gap_min: Some(160.0),
                    spacing_min: None,
                    fog_overlay: Some(0.35),
                    objective: Objective::Survive { seconds: 60.0 },
                },
                Mission {
                    id: "gale_gate".to_string(),
                    name: "Gale Gate".to_string(),
                    weather_bias: Some("tailwind".to_string()),
                    scroll_multiplier: Some(1.15),
                    meteor_interval_multiplier: Some(1.2),
                    fire_cooldown_multiplier: None,
                    gap_min: None,
                    spacing_min: Some(220.0),
                    fog_overlay: None,
                    objective: Objective::Score { target: 25 },
                },
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Mission> {
        self.missions.iter().find(|m| m.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.missions.iter().position(|m| m.id == id)
    }
}

/// Persisted campaign progress
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignProgress {
    /// Missions at or below this index are playable
    pub unlocked: usize,
    /// Ids of cleared missions
    pub completed: Vec<String>,
}

impl CampaignProgress {
    pub fn is_unlocked(&self, index: usize) -> bool {
        index <= self.unlocked
    }

    /// Record a cleared mission; unlocks the next one. Returns true if new.
    pub fn record_completion(&mut self, catalog: &MissionCatalog, id: &str) -> bool {
        if self.completed.iter().any(|c| c == id) {
            return false;
        }
        self.completed.push(id.to_string());
        if let Some(index) = catalog.index_of(id) {
            let next = (index + 1).min(catalog.missions.len().saturating_sub(1));
            self.unlocked = self.unlocked.max(next);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_mission() -> Mission {
        Mission {
            id: "test".to_string(),
            name: "Test".to_string(),
            weather_bias: None,
            scroll_multiplier: None,
            meteor_interval_multiplier: None,
            fire_cooldown_multiplier: None,
            gap_min: None,
            spacing_min: None,
            fog_overlay: None,
            objective: Objective::Score { target: 10 },
        }
    }

    #[test]
    fn test_blank_mission_is_neutral() {
        let mods = CampaignModifiers::from_mission(&blank_mission());
        assert_eq!(mods, CampaignModifiers::default());
    }

    #[test]
    fn test_bad_multipliers_are_sanitized() {
        let mission = Mission {
            scroll_multiplier: Some(f32::NAN),
            meteor_interval_multiplier: Some(0.0),
            fire_cooldown_multiplier: Some(-4.0),
            ..blank_mission()
        };
        let mods = CampaignModifiers::from_mission(&mission);
        assert_eq!(mods.scroll_multiplier, 1.0);
        assert_eq!(mods.hazard_interval_multiplier, MIN_CAMPAIGN_MULTIPLIER);
        assert_eq!(mods.fire_cooldown_multiplier, MIN_CAMPAIGN_MULTIPLIER);

        let mission = Mission {
            scroll_multiplier: Some(f32::INFINITY),
            meteor_interval_multiplier: Some(50.0),
            ..blank_mission()
        };
        let mods = CampaignModifiers::from_mission(&mission);
        assert_eq!(mods.scroll_multiplier, 1.0);
        assert_eq!(mods.hazard_interval_multiplier, MAX_CAMPAIGN_MULTIPLIER);
    }

    #[test]
    fn test_invalid_overrides_become_none() {
        let mission = Mission {
            gap_min: Some(20.0),
            spacing_min: Some(f32::NAN),
            fog_overlay: Some(1.5),
            weather_bias: Some("blizzard".to_string()),
            ..blank_mission()
        };
        let mods = CampaignModifiers::from_mission(&mission);
        assert_eq!(mods.gap_min, None);
        assert_eq!(mods.spacing_min, None);
        assert_eq!(mods.fog_overlay, None);
        assert_eq!(mods.weather_bias, None);
        assert_eq!(mods.effective_gap_min(), GAP_MIN);
    }

    #[test]
    fn test_valid_overrides_kept() {
        let mission = Mission {
            gap_min: Some(170.0),
            spacing_min: Some(200.0),
            fog_overlay: Some(0.4),
            weather_bias: Some("Fog".to_string()),
            ..blank_mission()
        };
        let mods = CampaignModifiers::from_mission(&mission);
        assert_eq!(mods.gap_min, Some(170.0));
        assert_eq!(mods.spacing_min, Some(200.0));
        assert_eq!(mods.fog_overlay, Some(0.4));
        assert_eq!(mods.weather_bias, Some(WeatherKind::Fog));
        assert_eq!(mods.effective_gap_min(), 170.0);
    }

    #[test]
    fn test_catalog_from_json_shapes() {
        let wrapped = r#"{"missions": [{"id": "a", "name": "A",
            "objective": {"kind": "kills", "target": 5}}]}"#;
        let catalog = MissionCatalog::from_json(wrapped).unwrap();
        assert_eq!(catalog.missions[0].objective, Objective::Kills { target: 5 });

        let bare = r#"[{"id": "b", "name": "B", "scroll_multiplier": 1.2,
            "objective": {"kind": "survive", "seconds": 30.0}}]"#;
        let catalog = MissionCatalog::from_json(bare).unwrap();
        assert_eq!(catalog.missions[0].scroll_multiplier, Some(1.2));

        assert!(matches!(MissionCatalog::from_json("[]"), Err(CampaignError::Empty)));
        assert!(matches!(MissionCatalog::from_json("{oops"), Err(CampaignError::Parse(_))));
    }

    #[test]
    fn test_objective_progress() {
        let stats = RunStats {
            score: 5,
            kills: 12,
            elapsed: 15.0,
            shards: 0,
        };
        assert_eq!(Objective::Score { target: 10 }.progress(&stats), 0.5);
        assert!(Objective::Kills { target: 12 }.is_met(&stats));
        assert!(!Objective::Survive { seconds: 60.0 }.is_met(&stats));
        assert!(Objective::Shards { target: 0 }.is_met(&stats));
    }

    #[test]
    fn test_progress_unlocks_next() {
        let catalog = MissionCatalog::builtin();
        let mut progress = CampaignProgress::default();
        assert!(progress.is_unlocked(0));
        assert!(!progress.is_unlocked(1));

        assert!(progress.record_completion(&catalog, "ashen_gate"));
        assert!(progress.is_unlocked(1));
        assert!(!progress.record_completion(&catalog, "ashen_gate"));

        progress.record_completion(&catalog, "gale_gate");
        assert_eq!(progress.unlocked, 2);
    }

    #[test]
    fn test_builtin_missions_sanitize_cleanly() {
        for mission in MissionCatalog::builtin().missions {
            let mods = CampaignModifiers::from_mission(&mission);
            assert!(mods.weather_bias.is_some(), "{} bias", mission.id);
            assert_eq!(mods.gap_min, mission.gap_min);
            assert_eq!(mods.spacing_min, mission.spacing_min);
        }
    }
}
