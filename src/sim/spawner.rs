//! Procedural spawning
//!
//! Difficulty is recomputed every tick from score and elapsed time. It drives
//! gap size, spacing, meteor cadence and the meteor band. Campaign overrides
//! replace the difficulty-derived minimums.

use glam::Vec2;
use rand::Rng;

use super::campaign::CampaignModifiers;
use super::geom::{ease_in_out_quad, ease_out_quad, lerp, sample_range};
use super::modifiers::EffectiveModifiers;
use super::powerup::ALL_POWERUPS;
use super::state::{GameEvent, Hazard, Obstacle, PickupOrb, RunState};
use crate::consts::*;

/// Difficulty scalar in [0, 1]
pub fn difficulty(score: u32, elapsed: f32) -> f32 {
    let by_score = (score as f32).min(DIFFICULTY_SCORE_CEILING) / DIFFICULTY_SCORE_CEILING;
    let by_time = elapsed.clamp(0.0, DIFFICULTY_TIME_CEILING) / DIFFICULTY_TIME_CEILING;
    (DIFFICULTY_SCORE_WEIGHT * by_score + (1.0 - DIFFICULTY_SCORE_WEIGHT) * by_time).clamp(0.0, 1.0)
}

/// Gap between the pillar halves; never outside [gap_min, GAP_MAX]
pub fn gap_size(difficulty: f32, campaign: &CampaignModifiers) -> f32 {
    let gap_min = campaign.effective_gap_min();
    lerp(GAP_MAX, gap_min, ease_in_out_quad(difficulty)).clamp(gap_min.min(GAP_MAX), GAP_MAX)
}

/// Valid range for the gap centre so the whole gap stays in the safe band
pub fn gap_center_range(gap_size: f32) -> (f32, f32) {
    (
        SAFE_MARGIN + gap_size / 2.0,
        GROUND_Y - SAFE_MARGIN - gap_size / 2.0,
    )
}

/// Spacing range between pillar pairs; narrows as difficulty rises
pub fn spacing_range(difficulty: f32, campaign: &CampaignModifiers) -> (f32, f32) {
    let d = difficulty.clamp(0.0, 1.0);
    let lo = lerp(SPACING_EASY.0, SPACING_HARD.0, d);
    let hi = lerp(SPACING_EASY.1, SPACING_HARD.1, d);
    match campaign.spacing_min {
        Some(min) => (min, hi.max(min)),
        None => (lo, hi),
    }
}

/// Seconds between meteors
pub fn hazard_interval(modifiers: &EffectiveModifiers) -> f32 {
    lerp(
        HAZARD_INTERVAL_START,
        HAZARD_INTERVAL_FLOOR,
        ease_out_quad(modifiers.difficulty),
    ) * modifiers.hazard_interval_multiplier
}

/// Vertical band meteors may spawn in
pub fn hazard_band(difficulty: f32) -> (f32, f32) {
    let margin = lerp(
        HAZARD_BAND_MARGIN.0,
        HAZARD_BAND_MARGIN.1,
        difficulty.clamp(0.0, 1.0),
    );
    (margin, GROUND_Y - margin)
}

/// Place a new pillar pair; returns seconds until the next one
pub fn spawn_obstacle(run: &mut RunState, modifiers: &EffectiveModifiers) -> f32 {
    let (spacing_lo, spacing_hi) = spacing_range(modifiers.difficulty, &run.campaign);
    let spacing = sample_range(&mut run.rng, spacing_lo, spacing_hi);

    let x = match run.obstacles.last() {
        Some(previous) => OBSTACLE_SPAWN_X.max(previous.trailing_edge() + spacing),
        None => OBSTACLE_SPAWN_X,
    };

    let gap = gap_size(modifiers.difficulty, &run.campaign);
    let (center_lo, center_hi) = gap_center_range(gap);
    let gap_center = sample_range(&mut run.rng, center_lo, center_hi);

    let id = run.next_entity_id();
    run.obstacles.push(Obstacle {
        id,
        x,
        width: OBSTACLE_WIDTH,
        gap_center,
        gap_size: gap,
        scored: false,
    });
    log::debug!(
        "Obstacle {} at x={:.0} gap {:.0}@{:.0}",
        id,
        x,
        gap,
        gap_center
    );

    // Next pair is due once this one's trailing edge sits `spacing` left of x
    ((spacing + OBSTACLE_WIDTH) / modifiers.scroll_speed.max(1.0)).max(MIN_OBSTACLE_INTERVAL)
}

/// Launch a meteor from the right edge
pub fn spawn_hazard(run: &mut RunState, modifiers: &EffectiveModifiers) {
    let radius = sample_range(&mut run.rng, HAZARD_RADIUS.0, HAZARD_RADIUS.1);
    let speed = sample_range(&mut run.rng, HAZARD_SPEED.0, HAZARD_SPEED.1);
    let drift = sample_range(&mut run.rng, -HAZARD_DRIFT, HAZARD_DRIFT);
    let (band_lo, band_hi) = hazard_band(modifiers.difficulty);
    let y = sample_range(&mut run.rng, band_lo, band_hi);

    let id = run.next_entity_id();
    run.hazards.push(Hazard {
        id,
        pos: Vec2::new(WORLD_WIDTH + radius + 8.0, y),
        radius,
        speed,
        drift,
    });
    log::debug!("Meteor {} at y={:.0} r={:.1}", id, y, radius);
}

/// Count down and spawn pillar pairs
pub fn update_obstacles(run: &mut RunState, modifiers: &EffectiveModifiers, dt: f32) {
    run.timers.obstacle -= dt;
    if run.timers.obstacle <= 0.0 {
        run.timers.obstacle = spawn_obstacle(run, modifiers);
    }
}

/// Count down and spawn meteors
pub fn update_hazards(run: &mut RunState, modifiers: &EffectiveModifiers, dt: f32) {
    run.timers.hazard -= dt;
    if run.timers.hazard <= 0.0 {
        spawn_hazard(run, modifiers);
        run.timers.hazard = hazard_interval(modifiers);
    }
}

/// Spend shards on an orb when none is outstanding
pub fn try_spawn_pickup(run: &mut RunState) -> bool {
    if run.pickup.is_some() || !run.shards.try_spend_threshold() {
        return false;
    }

    let kind = ALL_POWERUPS[run.rng.random_range(0..ALL_POWERUPS.len())];
    // Whole bob arc inside the safe band
    let (band_lo, band_hi) = gap_center_range(PICKUP_RADIUS * 2.0 + PICKUP_BOB_AMPLITUDE * 2.0);
    let y = sample_range(&mut run.rng, band_lo, band_hi);
    let phase = sample_range(&mut run.rng, 0.0, std::f32::consts::TAU);

    let id = run.next_entity_id();
    run.pickup = Some(PickupOrb {
        id,
        base: Vec2::new(WORLD_WIDTH + PICKUP_RADIUS + 8.0, y),
        phase,
        radius: PICKUP_RADIUS,
        kind,
        tint: kind.definition().tint,
    });
    run.push_event(GameEvent::PickupSpawned { kind });
    log::debug!("Pickup {} ({}) spawned", id, kind.as_str());
    true
}
