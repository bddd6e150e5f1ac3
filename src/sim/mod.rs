//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied, clamped delta only
//! - Seeded RNG only (per run, and a separate stream for weather)
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies

pub mod campaign;
pub mod collision;
pub mod geom;
pub mod modifiers;
pub mod powerup;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod weather;

pub use campaign::{
    CampaignError, CampaignModifiers, CampaignProgress, Mission, MissionCatalog, Objective,
    RunStats,
};
pub use geom::Rect;
pub use modifiers::EffectiveModifiers;
pub use powerup::{
    ActivePowerUp, Activation, CombinedEffects, EffectFlags, PowerUpKind, PowerUpState,
    ShardWallet,
};
pub use snapshot::RunSnapshot;
pub use state::{
    Avatar, GameEvent, Hazard, MAX_PARTICLES, Obstacle, Particle, PickupOrb, Projectile, RunPhase,
    RunState, TerminationCause,
};
pub use tick::{TickInput, autopilot_input, tick};
pub use weather::{WeatherKind, WeatherModifiers, WeatherState, WeatherSystem, WeatherVisual};
