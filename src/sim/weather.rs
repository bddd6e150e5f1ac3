//! Weather state machine
//!
//! Cycles through a small catalog of weather states and crossfades between
//! them. Gameplay multipliers are blended here; visual descriptors are handed
//! to the renderer unmixed, together with the blend factor.

use glam::{Vec3, Vec4};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geom::{clamp, lerp, sample_range};
use crate::consts::WEATHER_TRANSITION;

/// Weather identifiers, in catalog order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherKind {
    Clear,
    Drizzle,
    Tailwind,
    Fog,
    EmberStorm,
}

impl WeatherKind {
    pub fn id(&self) -> &'static str {
        match self {
            WeatherKind::Clear => "clear",
            WeatherKind::Drizzle => "drizzle",
            WeatherKind::Tailwind => "tailwind",
            WeatherKind::Fog => "fog",
            WeatherKind::EmberStorm => "ember_storm",
        }
    }

    pub fn from_id(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "clear" => Some(WeatherKind::Clear),
            "drizzle" | "rain" => Some(WeatherKind::Drizzle),
            "tailwind" | "wind" => Some(WeatherKind::Tailwind),
            "fog" => Some(WeatherKind::Fog),
            "ember_storm" | "emberstorm" | "meteor_shower" => Some(WeatherKind::EmberStorm),
            _ => None,
        }
    }
}

/// Renderer-facing look of one weather state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherLook {
    /// Sky gradient stops, top to bottom (RGB 0-1)
    pub gradient: [Vec3; 3],
    /// Full-screen overlay tint (RGBA)
    pub overlay: Vec4,
    /// Multiplier on star opacity
    pub star_opacity: f32,
    pub fog_alpha: f32,
}

/// Static catalog entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherState {
    pub kind: WeatherKind,
    /// Hold duration range in seconds
    pub duration: (f32, f32),
    pub scroll_speed: f32,
    pub hazard_interval: f32,
    pub gravity: f32,
    pub look: WeatherLook,
}

pub const WEATHER_CATALOG: [WeatherState; 5] = [
    WeatherState {
        kind: WeatherKind::Clear,
        duration: (18.0, 28.0),
        scroll_speed: 1.0,
        hazard_interval: 1.0,
        gravity: 1.0,
        look: WeatherLook {
            gradient: [
                Vec3::new(0.067, 0.141, 0.290),
                Vec3::new(0.114, 0.184, 0.341),
                Vec3::new(0.161, 0.102, 0.173),
            ],
            overlay: Vec4::new(0.0, 0.0, 0.0, 0.0),
            star_opacity: 1.0,
            fog_alpha: 0.0,
        },
    },
    WeatherState {
        kind: WeatherKind::Drizzle,
        duration: (14.0, 22.0),
        scroll_speed: 0.94,
        hazard_interval: 1.10,
        gravity: 1.06,
        look: WeatherLook {
            gradient: [
                Vec3::new(0.090, 0.125, 0.200),
                Vec3::new(0.137, 0.173, 0.255),
                Vec3::new(0.122, 0.125, 0.176),
            ],
            overlay: Vec4::new(0.35, 0.45, 0.60, 0.12),
            star_opacity: 0.35,
            fog_alpha: 0.08,
        },
    },
    WeatherState {
        kind: WeatherKind::Tailwind,
        duration: (12.0, 18.0),
        scroll_speed: 1.16,
        hazard_interval: 0.92,
        gravity: 0.94,
        look: WeatherLook {
            gradient: [
                Vec3::new(0.094, 0.196, 0.353),
                Vec3::new(0.184, 0.294, 0.447),
                Vec3::new(0.306, 0.227, 0.298),
            ],
            overlay: Vec4::new(0.80, 0.90, 1.00, 0.05),
            star_opacity: 0.8,
            fog_alpha: 0.0,
        },
    },
    WeatherState {
        kind: WeatherKind::Fog,
        duration: (14.0, 20.0),
        scroll_speed: 0.90,
        hazard_interval: 1.18,
        gravity: 1.0,
        look: WeatherLook {
            gradient: [
                Vec3::new(0.180, 0.200, 0.243),
                Vec3::new(0.231, 0.247, 0.282),
                Vec3::new(0.200, 0.196, 0.220),
            ],
            overlay: Vec4::new(0.75, 0.78, 0.82, 0.18),
            star_opacity: 0.1,
            fog_alpha: 0.45,
        },
    },
    WeatherState {
        kind: WeatherKind::EmberStorm,
        duration: (10.0, 16.0),
        scroll_speed: 1.04,
        hazard_interval: 0.62,
        gravity: 1.02,
        look: WeatherLook {
            gradient: [
                Vec3::new(0.220, 0.082, 0.090),
                Vec3::new(0.357, 0.129, 0.098),
                Vec3::new(0.196, 0.071, 0.094),
            ],
            overlay: Vec4::new(1.00, 0.45, 0.15, 0.10),
            star_opacity: 0.5,
            fog_alpha: 0.05,
        },
    },
];

/// Blended gameplay multipliers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherModifiers {
    pub scroll_speed: f32,
    pub hazard_interval: f32,
    pub gravity: f32,
}

impl Default for WeatherModifiers {
    fn default() -> Self {
        Self {
            scroll_speed: 1.0,
            hazard_interval: 1.0,
            gravity: 1.0,
        }
    }
}

/// Previous/current looks plus crossfade progress, for the renderer to mix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherVisual {
    pub previous: WeatherKind,
    pub current: WeatherKind,
    pub previous_look: WeatherLook,
    pub current_look: WeatherLook,
    /// 0 = all previous, 1 = all current
    pub blend: f32,
}

/// Weather runtime (one per process)
#[derive(Debug, Clone)]
pub struct WeatherSystem {
    catalog: Vec<WeatherState>,
    current: usize,
    previous: usize,
    /// Seconds until the next transition starts
    hold_timer: f32,
    /// Seconds left in the running crossfade (0 = settled)
    transition_timer: f32,
    bias: Option<WeatherKind>,
    rng: Pcg32,
}

impl WeatherSystem {
    pub fn new(seed: u64) -> Self {
        Self::with_catalog(WEATHER_CATALOG.to_vec(), seed)
    }

    /// Build from a custom catalog. An empty catalog falls back to the built-in one.
    pub fn with_catalog(catalog: Vec<WeatherState>, seed: u64) -> Self {
        let catalog = if catalog.is_empty() {
            WEATHER_CATALOG.to_vec()
        } else {
            catalog
        };
        let mut system = Self {
            catalog,
            current: 0,
            previous: 0,
            hold_timer: 0.0,
            transition_timer: 0.0,
            bias: None,
            rng: Pcg32::seed_from_u64(seed),
        };
        system.hold_timer = system.sample_hold(0);
        system
    }

    /// Back to the initial state with a fresh hold; the RNG stream continues
    pub fn reset(&mut self) {
        self.current = 0;
        self.previous = 0;
        self.transition_timer = 0.0;
        self.bias = None;
        self.hold_timer = self.sample_hold(0);
    }

    fn sample_hold(&mut self, index: usize) -> f32 {
        let (min, max) = self.catalog[index].duration;
        sample_range(&mut self.rng, min, max)
    }

    pub fn current(&self) -> WeatherKind {
        self.catalog[self.current].kind
    }

    pub fn previous(&self) -> WeatherKind {
        self.catalog[self.previous].kind
    }

    pub fn bias(&self) -> Option<WeatherKind> {
        self.bias
    }

    pub fn hold_remaining(&self) -> f32 {
        self.hold_timer
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition_timer > 0.0
    }

    /// Prefer `kind` at the next automatic transition
    pub fn set_bias(&mut self, kind: Option<WeatherKind>) {
        self.bias = kind;
    }

    /// Cap the current hold so the next transition happens within `max_hold` seconds
    pub fn hasten(&mut self, max_hold: f32) {
        if !self.is_transitioning() {
            self.hold_timer = self.hold_timer.min(max_hold.max(0.0));
        }
    }

    /// Crossfade progress in [0, 1]
    pub fn blend(&self) -> f32 {
        clamp(1.0 - self.transition_timer / WEATHER_TRANSITION, 0.0, 1.0)
    }

    /// Advance timers; starts a transition when the hold runs out
    pub fn update(&mut self, dt: f32) {
        if self.transition_timer > 0.0 {
            self.transition_timer = (self.transition_timer - dt).max(0.0);
            return;
        }

        self.hold_timer -= dt;
        if self.hold_timer <= 0.0 {
            self.begin_transition();
        }
    }

    fn begin_transition(&mut self) {
        let next = self.pick_next();
        self.previous = self.current;
        self.current = next;
        self.hold_timer = self.sample_hold(next);
        self.transition_timer = WEATHER_TRANSITION;
        log::info!(
            "Weather: {} -> {}",
            self.catalog[self.previous].kind.id(),
            self.catalog[self.current].kind.id()
        );
    }

    fn pick_next(&mut self) -> usize {
        let count = self.catalog.len();
        if count <= 1 {
            self.bias = None;
            return self.current;
        }

        if let Some(kind) = self.bias.take() {
            if let Some(index) = self.catalog.iter().position(|w| w.kind == kind) {
                if index != self.current {
                    return index;
                }
            }
        }

        // Skip over the current index so the same state never repeats
        let roll = self.rng.random_range(0..count - 1);
        if roll >= self.current { roll + 1 } else { roll }
    }

    /// Blended gameplay multipliers
    pub fn gameplay_modifiers(&self) -> WeatherModifiers {
        let from = &self.catalog[self.previous];
        let to = &self.catalog[self.current];
        let t = self.blend();
        WeatherModifiers {
            scroll_speed: lerp(from.scroll_speed, to.scroll_speed, t),
            hazard_interval: lerp(from.hazard_interval, to.hazard_interval, t),
            gravity: lerp(from.gravity, to.gravity, t),
        }
    }

    pub fn visual(&self) -> WeatherVisual {
        let from = &self.catalog[self.previous];
        let to = &self.catalog[self.current];
        WeatherVisual {
            previous: from.kind,
            current: to.kind,
            previous_look: from.look,
            current_look: to.look,
            blend: self.blend(),
        }
    }
}
