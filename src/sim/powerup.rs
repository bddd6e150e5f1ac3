//! Power-up economy
//!
//! Shards are earned by destroying meteors. Crossing the threshold spawns a
//! pickup orb; collecting it activates one of the definitions below. The rest
//! of the simulation only ever sees [`CombinedEffects`].

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::consts::{SHARD_CAP, SHARD_THRESHOLD};

/// Remaining time at or below this counts as expired (absorbs float drift)
const EXPIRY_EPSILON: f32 = 1e-4;

/// Maximum concurrent timed buffs that are not continuous effects
pub const MAX_ACTIVE_POWERUPS: usize = 3;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Bigger, piercing fireballs
    FlameSurge,
    /// One shield charge
    AegisShield,
    /// Slower world, floatier dragon, fewer meteors
    WindGlyph,
}

pub const ALL_POWERUPS: [PowerUpKind; 3] = [
    PowerUpKind::FlameSurge,
    PowerUpKind::AegisShield,
    PowerUpKind::WindGlyph,
];

/// Static catalog entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUpDefinition {
    pub kind: PowerUpKind,
    /// Seconds; 0 = instantaneous
    pub duration: f32,
    pub fireball_radius_bonus: f32,
    pub pierce_bonus: u32,
    pub scroll_multiplier: f32,
    pub gravity_multiplier: f32,
    pub meteor_interval_multiplier: f32,
    pub shield_charges: u32,
    /// Continuous effects are exempt from the concurrency cap
    pub continuous: bool,
    pub tint: Vec4,
}

const FLAME_SURGE: PowerUpDefinition = PowerUpDefinition {
    kind: PowerUpKind::FlameSurge,
    duration: 8.0,
    fireball_radius_bonus: 6.0,
    pierce_bonus: 1,
    scroll_multiplier: 1.0,
    gravity_multiplier: 1.0,
    meteor_interval_multiplier: 1.0,
    shield_charges: 0,
    continuous: true,
    tint: Vec4::new(1.0, 0.55, 0.15, 1.0),
};

const AEGIS_SHIELD: PowerUpDefinition = PowerUpDefinition {
    kind: PowerUpKind::AegisShield,
    duration: 0.0,
    fireball_radius_bonus: 0.0,
    pierce_bonus: 0,
    scroll_multiplier: 1.0,
    gravity_multiplier: 1.0,
    meteor_interval_multiplier: 1.0,
    shield_charges: 1,
    continuous: false,
    tint: Vec4::new(0.45, 0.85, 1.0, 1.0),
};

const WIND_GLYPH: PowerUpDefinition = PowerUpDefinition {
    kind: PowerUpKind::WindGlyph,
    duration: 6.0,
    fireball_radius_bonus: 0.0,
    pierce_bonus: 0,
    scroll_multiplier: 0.82,
    gravity_multiplier: 0.86,
    meteor_interval_multiplier: 1.3,
    shield_charges: 0,
    continuous: true,
    tint: Vec4::new(0.6, 1.0, 0.7, 1.0),
};

impl PowerUpKind {
    pub fn definition(&self) -> &'static PowerUpDefinition {
        match self {
            PowerUpKind::FlameSurge => &FLAME_SURGE,
            PowerUpKind::AegisShield => &AEGIS_SHIELD,
            PowerUpKind::WindGlyph => &WIND_GLYPH,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::FlameSurge => "flameSurge",
            PowerUpKind::AegisShield => "aegisShield",
            PowerUpKind::WindGlyph => "windGlyph",
        }
    }
}

/// A running timed buff
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub remaining: f32,
    pub duration: f32,
}

impl ActivePowerUp {
    /// Remaining fraction in [0, 1] (for HUD timers)
    pub fn fraction(&self) -> f32 {
        if self.duration <= 0.0 {
            0.0
        } else {
            (self.remaining / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// Effect flags for timed buffs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectFlags {
    pub flame_surge: bool,
    pub wind_glyph: bool,
}

impl EffectFlags {
    pub fn is_set(&self, kind: PowerUpKind) -> bool {
        match kind {
            PowerUpKind::FlameSurge => self.flame_surge,
            PowerUpKind::WindGlyph => self.wind_glyph,
            PowerUpKind::AegisShield => false,
        }
    }

    fn set(&mut self, kind: PowerUpKind, on: bool) {
        match kind {
            PowerUpKind::FlameSurge => self.flame_surge = on,
            PowerUpKind::WindGlyph => self.wind_glyph = on,
            PowerUpKind::AegisShield => {}
        }
    }
}

/// Every buff's contribution folded into one record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedEffects {
    pub scroll_multiplier: f32,
    pub gravity_multiplier: f32,
    pub fireball_radius_bonus: f32,
    pub pierce_bonus: u32,
    pub hazard_interval_multiplier: f32,
}

impl Default for CombinedEffects {
    fn default() -> Self {
        Self {
            scroll_multiplier: 1.0,
            gravity_multiplier: 1.0,
            fireball_radius_bonus: 0.0,
            pierce_bonus: 0,
            hazard_interval_multiplier: 1.0,
        }
    }
}

/// What an activation did (for events/audio)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Added shield charges only
    Charged,
    /// New timed entry
    Started,
    /// Existing entry reset to full duration
    Refreshed,
    /// Cap reached, timed part ignored
    Rejected,
}

/// Per-run power-up bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerUpState {
    pub active: Vec<ActivePowerUp>,
    pub flags: EffectFlags,
    pub shield_charges: u32,
}

impl PowerUpState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&mut self, kind: PowerUpKind) -> Activation {
        let def = kind.definition();
        let mut outcome = Activation::Rejected;

        if def.shield_charges > 0 {
            self.shield_charges += def.shield_charges;
            outcome = Activation::Charged;
        }

        if def.duration <= 0.0 {
            return outcome;
        }

        if let Some(existing) = self.active.iter_mut().find(|a| a.kind == kind) {
            existing.remaining = def.duration;
            existing.duration = def.duration;
            self.flags.set(kind, true);
            log::debug!("Power-up {} refreshed", kind.as_str());
            return Activation::Refreshed;
        }

        let capped = self
            .active
            .iter()
            .filter(|a| !a.kind.definition().continuous)
            .count()
            >= MAX_ACTIVE_POWERUPS;
        if capped && !def.continuous {
            log::debug!("Power-up {} ignored (cap reached)", kind.as_str());
            return outcome;
        }

        self.active.push(ActivePowerUp {
            kind,
            remaining: def.duration,
            duration: def.duration,
        });
        self.flags.set(kind, true);
        log::debug!("Power-up {} started ({}s)", kind.as_str(), def.duration);
        Activation::Started
    }

    /// Age every buff; returns the kinds that expired this step
    pub fn update(&mut self, dt: f32) -> Vec<PowerUpKind> {
        let mut expired = Vec::new();
        for buff in &mut self.active {
            buff.remaining -= dt;
            if buff.remaining <= EXPIRY_EPSILON {
                expired.push(buff.kind);
            }
        }
        if !expired.is_empty() {
            self.active.retain(|a| a.remaining > EXPIRY_EPSILON);
            for kind in &expired {
                self.flags.set(*kind, false);
                log::debug!("Power-up {} expired", kind.as_str());
            }
        }
        expired
    }

    /// Spend one shield charge if available
    pub fn consume_shield(&mut self) -> bool {
        if self.shield_charges > 0 {
            self.shield_charges -= 1;
            true
        } else {
            false
        }
    }

    pub fn combined(&self) -> CombinedEffects {
        let mut fx = CombinedEffects::default();
        for kind in ALL_POWERUPS {
            if !self.flags.is_set(kind) {
                continue;
            }
            let def = kind.definition();
            fx.scroll_multiplier *= def.scroll_multiplier;
            fx.gravity_multiplier *= def.gravity_multiplier;
            fx.hazard_interval_multiplier *= def.meteor_interval_multiplier;
            fx.fireball_radius_bonus += def.fireball_radius_bonus;
            fx.pierce_bonus += def.pierce_bonus;
        }
        fx
    }
}

/// Shard currency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardWallet {
    /// Spendable shards, capped at `SHARD_CAP`
    pub balance: u32,
    /// Every shard ever earned this run (objective counter)
    pub lifetime: u32,
}

impl ShardWallet {
    pub fn add(&mut self, amount: u32) {
        self.balance = (self.balance + amount).min(SHARD_CAP);
        self.lifetime += amount;
    }

    /// Consume one threshold's worth of shards if the balance allows it
    pub fn try_spend_threshold(&mut self) -> bool {
        if self.balance >= SHARD_THRESHOLD {
            self.balance -= SHARD_THRESHOLD;
            true
        } else {
            false
        }
    }
}
