//! Flappy Dragon - simulation core for a side-scrolling hazard-avoidance arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, weather, power-ups)
//! - `session`: One player session owning the run, weather and collaborators
//! - `audio`: Fire-and-forget sound cue collaborator
//! - `persistence`: Key/value storage collaborator (best score, mute, campaign progress)
//! - `settings`: Player preferences
//! - `platform`: Target-specific logger, storage and audio defaults

pub mod audio;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;

pub use session::GameSession;
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Logical world size (pixels)
    pub const WORLD_WIDTH: f32 = 480.0;
    pub const WORLD_HEIGHT: f32 = 800.0;
    /// Height of the ground strip at the bottom of the world
    pub const GROUND_HEIGHT: f32 = 80.0;
    /// Y of the ground line (avatar dies when touching it)
    pub const GROUND_Y: f32 = WORLD_HEIGHT - GROUND_HEIGHT;

    /// Largest delta the simulation will integrate in one tick (seconds)
    pub const MAX_DELTA: f32 = 1.0 / 30.0;
    /// Nominal frame delta used by tests and the headless runner
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Avatar (dragon) defaults
    pub const AVATAR_X: f32 = 140.0;
    pub const AVATAR_START_Y: f32 = WORLD_HEIGHT * 0.45;
    pub const AVATAR_RADIUS: f32 = 18.0;
    /// Downward acceleration (pixels/s², y grows downward)
    pub const GRAVITY: f32 = 1500.0;
    /// Velocity set by a flap (negative = up)
    pub const FLAP_IMPULSE: f32 = -460.0;
    /// Terminal fall speed
    pub const MAX_FALL_SPEED: f32 = 720.0;
    /// Rotation per unit of vertical velocity (radians per px/s)
    pub const ROTATION_PER_SPEED: f32 = 1.0 / 600.0;
    pub const MIN_ROTATION: f32 = -0.55;
    pub const MAX_ROTATION: f32 = 1.25;

    /// Horizontal scroll speed at difficulty 0 and 1 (pixels/s)
    pub const BASE_SCROLL_SPEED: f32 = 160.0;
    pub const MAX_SCROLL_SPEED: f32 = 235.0;

    /// Difficulty curve inputs
    pub const DIFFICULTY_SCORE_CEILING: f32 = 40.0;
    pub const DIFFICULTY_TIME_CEILING: f32 = 120.0;
    pub const DIFFICULTY_SCORE_WEIGHT: f32 = 0.6;

    /// Pillar pairs
    pub const OBSTACLE_WIDTH: f32 = 78.0;
    pub const GAP_MAX: f32 = 210.0;
    pub const GAP_MIN: f32 = 140.0;
    /// Gaps stay this far from the ceiling and the ground line
    pub const SAFE_MARGIN: f32 = 60.0;
    pub const SPACING_EASY: (f32, f32) = (250.0, 330.0);
    pub const SPACING_HARD: (f32, f32) = (190.0, 240.0);
    /// X where new pillars appear (just off the right edge)
    pub const OBSTACLE_SPAWN_X: f32 = WORLD_WIDTH + 40.0;
    pub const MIN_OBSTACLE_INTERVAL: f32 = 0.85;
    pub const FIRST_OBSTACLE_DELAY: f32 = 1.1;
    /// Pillar hit-rectangles shrink by this much on every side
    pub const FAIRNESS_INSET: f32 = 4.0;

    /// Meteors
    pub const HAZARD_INTERVAL_START: f32 = 3.2;
    pub const HAZARD_INTERVAL_FLOOR: f32 = 1.15;
    pub const FIRST_HAZARD_DELAY: f32 = 2.5;
    pub const HAZARD_RADIUS: (f32, f32) = (13.0, 21.0);
    pub const HAZARD_SPEED: (f32, f32) = (40.0, 110.0);
    pub const HAZARD_DRIFT: f32 = 35.0;
    /// Meteors move at this fraction of the scroll speed plus their own speed
    pub const HAZARD_SCROLL_FACTOR: f32 = 1.1;
    /// Vertical spawn band margin at difficulty 0 and 1
    pub const HAZARD_BAND_MARGIN: (f32, f32) = (90.0, 170.0);

    /// Fireballs
    pub const PROJECTILE_SPEED: f32 = 540.0;
    pub const PROJECTILE_RADIUS: f32 = 10.0;
    pub const PROJECTILE_LIFETIME: f32 = 1.4;
    pub const FIRE_COOLDOWN: f32 = 0.32;
    /// Lifetime floor granted after piercing through a meteor
    pub const PIERCE_LIFETIME_FLOOR: f32 = 0.25;

    /// Pickup orbs
    pub const PICKUP_RADIUS: f32 = 16.0;
    pub const PICKUP_SPEED_OFFSET: f32 = 24.0;
    pub const PICKUP_BOB_AMPLITUDE: f32 = 14.0;
    pub const PICKUP_BOB_SPEED: f32 = 3.2;

    /// Shard economy
    pub const SHARD_THRESHOLD: u32 = 10;
    pub const SHARD_CAP: u32 = SHARD_THRESHOLD * 5;
    pub const SHARDS_PER_METEOR: u32 = 2;

    /// Invulnerability after a shield absorbs a hit (seconds)
    pub const SHIELD_GRACE: f32 = 0.45;

    /// Weather crossfade length (seconds)
    pub const WEATHER_TRANSITION: f32 = 4.0;
}
