//! Freeze-frame copy of a finished run
//!
//! Taken once when a run ends. The game-over screen draws from it while only
//! its particles keep animating; the live run is never touched again.

use serde::{Deserialize, Serialize};

use super::powerup::{ActivePowerUp, EffectFlags, ShardWallet};
use super::state::{
    Avatar, Hazard, Obstacle, Particle, PickupOrb, Projectile, RunState, TerminationCause,
    update_particles,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub cause: TerminationCause,
    pub avatar: Avatar,
    pub obstacles: Vec<Obstacle>,
    pub hazards: Vec<Hazard>,
    pub projectiles: Vec<Projectile>,
    pub pickup: Option<PickupOrb>,
    pub particles: Vec<Particle>,
    pub score: u32,
    pub kills: u32,
    pub elapsed: f32,
    pub shards: ShardWallet,
    pub shield_charges: u32,
    pub active_powerups: Vec<ActivePowerUp>,
    pub effect_flags: EffectFlags,
}

impl RunSnapshot {
    /// Deep copy of everything the game-over screen shows
    pub fn capture(run: &RunState, cause: TerminationCause) -> Self {
        Self {
            cause,
            avatar: run.avatar,
            obstacles: run.obstacles.clone(),
            hazards: run.hazards.clone(),
            projectiles: run.projectiles.clone(),
            pickup: run.pickup,
            particles: run.particles.clone(),
            score: run.score,
            kills: run.kills,
            elapsed: run.elapsed,
            shards: run.shards,
            shield_charges: run.powerups.shield_charges,
            active_powerups: run.powerups.active.clone(),
            effect_flags: run.powerups.flags,
        }
    }

    /// Let the death burst finish animating
    pub fn tick_particles(&mut self, dt: f32) {
        update_particles(&mut self.particles, dt);
    }

    /// True once every particle has faded
    pub fn is_settled(&self) -> bool {
        self.particles.is_empty()
    }
}
