//! Effective per-tick modifiers
//!
//! Weather, power-ups and the campaign overlay all scale the same handful of
//! quantities. They are multiplied together here, once per tick, and the
//! result is threaded into physics and spawning.

use serde::{Deserialize, Serialize};

use super::campaign::CampaignModifiers;
use super::geom::{ease_in_out_quad, lerp};
use super::powerup::CombinedEffects;
use super::weather::WeatherModifiers;
use crate::consts::{BASE_SCROLL_SPEED, MAX_SCROLL_SPEED};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveModifiers {
    /// Difficulty scalar in [0, 1] used to derive the values below
    pub difficulty: f32,
    /// Absolute scroll speed (pixels/s)
    pub scroll_speed: f32,
    pub gravity_multiplier: f32,
    pub hazard_interval_multiplier: f32,
    pub fire_cooldown_multiplier: f32,
    pub fireball_radius_bonus: f32,
    pub pierce_bonus: u32,
}

impl EffectiveModifiers {
    /// Scroll speed before any multiplier, eased by difficulty
    pub fn base_scroll_speed(difficulty: f32) -> f32 {
        lerp(
            BASE_SCROLL_SPEED,
            MAX_SCROLL_SPEED,
            ease_in_out_quad(difficulty),
        )
    }

    /// Order: base (difficulty) × weather × power-ups × campaign
    pub fn compose(
        weather: &WeatherModifiers,
        effects: &CombinedEffects,
        campaign: &CampaignModifiers,
        difficulty: f32,
    ) -> Self {
        let difficulty = difficulty.clamp(0.0, 1.0);
        Self {
            difficulty,
            scroll_speed: Self::base_scroll_speed(difficulty)
                * weather.scroll_speed
                * effects.scroll_multiplier
                * campaign.scroll_multiplier,
            gravity_multiplier: weather.gravity * effects.gravity_multiplier,
            hazard_interval_multiplier: weather.hazard_interval
                * effects.hazard_interval_multiplier
                * campaign.hazard_interval_multiplier,
            fire_cooldown_multiplier: campaign.fire_cooldown_multiplier,
            fireball_radius_bonus: effects.fireball_radius_bonus,
            pierce_bonus: effects.pierce_bonus,
        }
    }
}

impl Default for EffectiveModifiers {
    fn default() -> Self {
        Self::compose(
            &WeatherModifiers::default(),
            &CombinedEffects::default(),
            &CampaignModifiers::default(),
            0.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_inputs_give_base_values() {
        let mods = EffectiveModifiers::default();
        assert_eq!(mods.scroll_speed, BASE_SCROLL_SPEED);
        assert_eq!(mods.gravity_multiplier, 1.0);
        assert_eq!(mods.hazard_interval_multiplier, 1.0);
        assert_eq!(mods.fire_cooldown_multiplier, 1.0);
        assert_eq!(mods.pierce_bonus, 0);
    }

    #[test]
    fn test_sources_multiply() {
        let weather = WeatherModifiers {
            scroll_speed: 1.2,
            hazard_interval: 0.5,
            gravity: 1.1,
        };
        let effects = CombinedEffects {
            scroll_multiplier: 0.5,
            gravity_multiplier: 0.8,
            fireball_radius_bonus: 6.0,
            pierce_bonus: 1,
            hazard_interval_multiplier: 2.0,
        };
        let campaign = CampaignModifiers {
            scroll_multiplier: 2.0,
            hazard_interval_multiplier: 1.5,
            fire_cooldown_multiplier: 0.8,
            ..CampaignModifiers::default()
        };
        let mods = EffectiveModifiers::compose(&weather, &effects, &campaign, 0.0);
        assert!((mods.scroll_speed - BASE_SCROLL_SPEED * 1.2).abs() < 1e-3);
        assert!((mods.gravity_multiplier - 0.88).abs() < 1e-6);
        assert!((mods.hazard_interval_multiplier - 1.5).abs() < 1e-6);
        assert_eq!(mods.fire_cooldown_multiplier, 0.8);
        assert_eq!(mods.fireball_radius_bonus, 6.0);
        assert_eq!(mods.pierce_bonus, 1);
    }

    #[test]
    fn test_difficulty_raises_scroll_speed() {
        let easy = EffectiveModifiers::base_scroll_speed(0.0);
        let mid = EffectiveModifiers::base_scroll_speed(0.5);
        let hard = EffectiveModifiers::base_scroll_speed(1.0);
        assert!(easy < mid && mid < hard);
        assert_eq!(hard, MAX_SCROLL_SPEED);
        // Out-of-range difficulty is clamped
        let mods = EffectiveModifiers::compose(
            &WeatherModifiers::default(),
            &CombinedEffects::default(),
            &CampaignModifiers::default(),
            4.0,
        );
        assert_eq!(mods.difficulty, 1.0);
    }
}
