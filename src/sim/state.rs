//! Run state and core simulation types
//!
//! Everything one run mutates lives in [`RunState`]. Nothing here is global,
//! so several runs can be simulated side by side.

use glam::{Vec2, Vec4};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::campaign::{CampaignModifiers, RunStats};
use super::geom::{Rect, clamp, wrap};
use super::modifiers::EffectiveModifiers;
use super::powerup::{PowerUpKind, PowerUpState, ShardWallet};
use crate::consts::*;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// No run (menu); collections are empty
    Idle,
    /// Simulating
    Active,
    /// Frozen until resumed
    Paused,
    /// Ended; only the snapshot animates
    Terminated,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationCause {
    Ceiling,
    Ground,
    Pillar,
    Meteor,
}

impl TerminationCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationCause::Ceiling => "ceiling",
            TerminationCause::Ground => "ground",
            TerminationCause::Pillar => "pillar",
            TerminationCause::Meteor => "meteor",
        }
    }
}

/// Things that happened during a tick, drained by the session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Flapped,
    Fired,
    Scored { obstacle_id: u32 },
    MeteorDestroyed { pos: Vec2 },
    PickupSpawned { kind: PowerUpKind },
    PowerUpActivated { kind: PowerUpKind },
    PowerUpExpired { kind: PowerUpKind },
    ShieldAbsorbed { cause: TerminationCause },
    Terminated { cause: TerminationCause },
}

/// The player's dragon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub pos: Vec2,
    /// Vertical velocity (positive = falling)
    pub vel_y: f32,
    /// Cosmetic tilt in radians
    pub rotation: f32,
    pub radius: f32,
}

impl Default for Avatar {
    fn default() -> Self {
        Self {
            pos: Vec2::new(AVATAR_X, AVATAR_START_Y),
            vel_y: 0.0,
            rotation: 0.0,
            radius: AVATAR_RADIUS,
        }
    }
}

impl Avatar {
    pub fn flap(&mut self) {
        self.vel_y = FLAP_IMPULSE;
    }

    /// Integrate gravity, clamp to terminal speed, update tilt
    pub fn integrate(&mut self, dt: f32, gravity_multiplier: f32) {
        self.vel_y = (self.vel_y + GRAVITY * gravity_multiplier * dt).min(MAX_FALL_SPEED);
        self.pos.y += self.vel_y * dt;
        self.rotation = clamp(self.vel_y * ROTATION_PER_SPEED, MIN_ROTATION, MAX_ROTATION);
    }

    pub fn touches_ceiling(&self) -> bool {
        self.pos.y - self.radius <= 0.0
    }

    pub fn touches_ground(&self) -> bool {
        self.pos.y + self.radius >= GROUND_Y
    }
}

/// A pillar pair with a gap between the halves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Left edge
    pub x: f32,
    pub width: f32,
    pub gap_center: f32,
    pub gap_size: f32,
    pub scored: bool,
}

impl Obstacle {
    pub fn gap_top(&self) -> f32 {
        self.gap_center - self.gap_size / 2.0
    }

    pub fn gap_bottom(&self) -> f32 {
        self.gap_center + self.gap_size / 2.0
    }

    pub fn trailing_edge(&self) -> f32 {
        self.x + self.width
    }

    /// Upper pillar, ceiling to gap
    pub fn top_rect(&self) -> Rect {
        Rect::new(self.x, 0.0, self.width, self.gap_top())
    }

    /// Lower pillar, gap to ground line
    pub fn bottom_rect(&self) -> Rect {
        Rect::new(self.x, self.gap_bottom(), self.width, GROUND_Y - self.gap_bottom())
    }

    pub fn advance(&mut self, speed: f32, dt: f32) {
        self.x -= speed * dt;
    }

    pub fn is_offscreen(&self) -> bool {
        self.trailing_edge() < 0.0
    }
}

/// A free-floating meteor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    /// Own leftward speed on top of the scroll
    pub speed: f32,
    /// Vertical drift (pixels/s)
    pub drift: f32,
}

impl Hazard {
    pub fn advance(&mut self, scroll_speed: f32, dt: f32) {
        self.pos.x -= (scroll_speed * HAZARD_SCROLL_FACTOR + self.speed) * dt;
        self.pos.y += self.drift * dt;
    }

    pub fn is_offscreen(&self) -> bool {
        self.pos.x + self.radius < 0.0
            || self.pos.y + self.radius < 0.0
            || self.pos.y - self.radius > GROUND_Y
    }
}

/// A fireball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel_x: f32,
    pub radius: f32,
    /// Seconds left
    pub life: f32,
    /// Meteors it can still pass through
    pub pierce: u32,
}

impl Projectile {
    pub fn advance(&mut self, dt: f32) {
        self.pos.x += self.vel_x * dt;
        self.life -= dt;
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0.0 || self.pos.x - self.radius > WORLD_WIDTH
    }
}

/// Collectible that activates a power-up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickupOrb {
    pub id: u32,
    /// Position without the bob offset
    pub base: Vec2,
    /// Bob phase in radians
    pub phase: f32,
    pub radius: f32,
    pub kind: PowerUpKind,
    pub tint: Vec4,
}

impl PickupOrb {
    /// Where the orb actually is (and is drawn)
    pub fn position(&self) -> Vec2 {
        Vec2::new(
            self.base.x,
            self.base.y + self.phase.sin() * PICKUP_BOB_AMPLITUDE,
        )
    }

    pub fn advance(&mut self, scroll_speed: f32, dt: f32) {
        self.base.x -= (scroll_speed + PICKUP_SPEED_OFFSET) * dt;
        self.phase = wrap(
            self.phase + PICKUP_BOB_SPEED * dt,
            0.0,
            std::f32::consts::TAU,
        );
    }

    pub fn is_offscreen(&self) -> bool {
        self.base.x + self.radius < 0.0
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Vec4,
    /// 1 → 0, removed at 0
    pub life: f32,
    pub size: f32,
}

/// Default particle cap
pub const MAX_PARTICLES: usize = 256;

/// Particle colors
pub mod palette {
    use glam::Vec4;

    pub const SCORE: Vec4 = Vec4::new(1.0, 0.92, 0.55, 1.0);
    pub const METEOR: Vec4 = Vec4::new(1.0, 0.48, 0.18, 1.0);
    pub const SHIELD: Vec4 = Vec4::new(0.45, 0.85, 1.0, 1.0);
    pub const DEATH: Vec4 = Vec4::new(1.0, 0.32, 0.42, 1.0);
    pub const PICKUP: Vec4 = Vec4::new(0.8, 1.0, 0.9, 1.0);
}

/// Advance and cull particles (shared by live runs and snapshots)
pub fn update_particles(particles: &mut Vec<Particle>, dt: f32) {
    for particle in particles.iter_mut() {
        particle.pos += particle.vel * dt;
        particle.vel.y += 240.0 * dt;
        particle.vel *= 0.98;
        particle.life -= dt * 1.6;
        particle.size *= 0.995;
    }
    particles.retain(|p| p.life > 0.0);
}

/// Pending spawn countdowns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnTimers {
    pub obstacle: f32,
    pub hazard: f32,
}

impl Default for SpawnTimers {
    fn default() -> Self {
        Self {
            obstacle: FIRST_OBSTACLE_DELAY,
            hazard: FIRST_HAZARD_DELAY,
        }
    }
}

/// Complete per-run state
#[derive(Debug, Clone)]
pub struct RunState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub phase: RunPhase,
    pub avatar: Avatar,
    /// Sorted by x (spawn order)
    pub obstacles: Vec<Obstacle>,
    pub hazards: Vec<Hazard>,
    pub projectiles: Vec<Projectile>,
    /// At most one orb at a time
    pub pickup: Option<PickupOrb>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub score: u32,
    pub kills: u32,
    /// Seconds simulated this run
    pub elapsed: f32,
    pub shards: ShardWallet,
    pub powerups: PowerUpState,
    pub campaign: CampaignModifiers,
    pub timers: SpawnTimers,
    /// Seconds until the next fireball may launch
    pub fire_cooldown: f32,
    /// Seconds of post-shield invulnerability left
    pub shield_grace: f32,
    /// Modifiers composed on the latest tick
    pub modifiers: EffectiveModifiers,
    pub termination: Option<TerminationCause>,
    pub max_particles: usize,
    events: Vec<GameEvent>,
    burst_counter: u32,
    next_id: u32,
}

impl RunState {
    /// A fresh, active run
    pub fn new(seed: u64, campaign: CampaignModifiers) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: RunPhase::Active,
            avatar: Avatar::default(),
            obstacles: Vec::new(),
            hazards: Vec::new(),
            projectiles: Vec::new(),
            pickup: None,
            particles: Vec::new(),
            score: 0,
            kills: 0,
            elapsed: 0.0,
            shards: ShardWallet::default(),
            powerups: PowerUpState::new(),
            campaign,
            timers: SpawnTimers::default(),
            fire_cooldown: 0.0,
            shield_grace: 0.0,
            modifiers: EffectiveModifiers::default(),
            termination: None,
            max_particles: MAX_PARTICLES,
            events: Vec::new(),
            burst_counter: 0,
            next_id: 1,
        }
    }

    /// An empty placeholder (no run in progress)
    pub fn idle() -> Self {
        let mut state = Self::new(0, CampaignModifiers::default());
        state.phase = RunPhase::Idle;
        state
    }

    pub fn is_active(&self) -> bool {
        self.phase == RunPhase::Active
    }

    pub fn is_terminated(&self) -> bool {
        self.phase == RunPhase::Terminated
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn shield_charges(&self) -> u32 {
        self.powerups.shield_charges
    }

    pub fn stats(&self) -> RunStats {
        RunStats {
            score: self.score,
            kills: self.kills,
            elapsed: self.elapsed,
            shards: self.shards.lifetime,
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// End the run. Further ticks are no-ops.
    pub fn terminate(&mut self, cause: TerminationCause) {
        if self.phase == RunPhase::Terminated {
            return;
        }
        let origin = self.avatar.pos;
        self.emit_burst(origin, palette::DEATH, 28, 260.0);
        self.phase = RunPhase::Terminated;
        self.termination = Some(cause);
        self.push_event(GameEvent::Terminated { cause });
        log::info!(
            "Run over ({}): score {}, kills {}, {:.1}s",
            cause.as_str(),
            self.score,
            self.kills,
            self.elapsed
        );
    }

    /// Drop every per-run entity and go idle
    pub fn clear(&mut self) {
        self.obstacles.clear();
        self.hazards.clear();
        self.projectiles.clear();
        self.pickup = None;
        self.particles.clear();
        self.events.clear();
        self.powerups = PowerUpState::new();
        self.phase = RunPhase::Idle;
    }

    /// Radial particle burst with deterministic hash-based spread
    pub fn emit_burst(&mut self, origin: Vec2, color: Vec4, count: u32, speed: f32) {
        if self.max_particles == 0 {
            return;
        }
        self.burst_counter = self.burst_counter.wrapping_add(1);
        let seed = self.burst_counter.wrapping_mul(2654435761);
        for i in 0..count {
            if self.particles.len() >= self.max_particles {
                // Remove oldest particles to make room
                self.particles.remove(0);
            }
            let hash = seed.wrapping_add(i.wrapping_mul(7919)).wrapping_mul(2654435761);
            let rand1 = (hash % 1000) as f32 / 1000.0;
            let rand2 = ((hash >> 10) % 1000) as f32 / 1000.0;
            let rand3 = ((hash >> 20) % 1000) as f32 / 1000.0;

            let angle = std::f32::consts::TAU * (i as f32 / count as f32) + rand1 * 0.5;
            let dir = Vec2::new(angle.cos(), angle.sin());
            self.particles.push(Particle {
                pos: origin,
                vel: dir * speed * (0.5 + rand2 * 0.5),
                color,
                life: 0.7 + rand3 * 0.3,
                size: 2.5 + rand2 * 3.0,
            });
        }
    }
}
