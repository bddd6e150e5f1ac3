//! Simulation tick
//!
//! Advances one run by one step. Order matters and is fixed:
//! intents, avatar physics, boundary checks, pillars, meteors, fireballs,
//! pickup, buff aging. A termination anywhere stops the rest of the tick.

use glam::Vec2;

use super::collision;
use super::modifiers::EffectiveModifiers;
use super::spawner;
use super::state::{GameEvent, Projectile, RunState, update_particles};
use super::weather::WeatherModifiers;
use crate::consts::*;

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Flap requested since the last tick
    pub flap: bool,
    /// Fireball requested since the last tick
    pub fire: bool,
}

/// Advance the run by `dt` seconds (clamped to `MAX_DELTA`, non-finite treated as zero)
pub fn tick(run: &mut RunState, weather: &WeatherModifiers, input: &TickInput, dt: f32) {
    if !run.is_active() {
        return;
    }
    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_DELTA)
    } else {
        0.0
    };

    run.elapsed += dt;
    run.fire_cooldown = (run.fire_cooldown - dt).max(0.0);
    run.shield_grace = (run.shield_grace - dt).max(0.0);

    let difficulty = spawner::difficulty(run.score, run.elapsed);
    let modifiers = EffectiveModifiers::compose(
        weather,
        &run.powerups.combined(),
        &run.campaign,
        difficulty,
    );
    run.modifiers = modifiers;

    // Intents
    if input.flap {
        run.avatar.flap();
        run.push_event(GameEvent::Flapped);
    }
    if input.fire {
        try_fire(run, &modifiers);
    }

    // Avatar
    run.avatar.integrate(dt, modifiers.gravity_multiplier);
    if collision::check_boundaries(run) {
        return;
    }

    // Pillars
    for obstacle in run.obstacles.iter_mut() {
        obstacle.advance(modifiers.scroll_speed, dt);
    }
    run.obstacles.retain(|o| !o.is_offscreen());
    spawner::update_obstacles(run, &modifiers, dt);
    if collision::check_obstacles(run) {
        return;
    }

    // Meteors
    for hazard in run.hazards.iter_mut() {
        hazard.advance(modifiers.scroll_speed, dt);
    }
    run.hazards.retain(|h| !h.is_offscreen());
    spawner::update_hazards(run, &modifiers, dt);
    if collision::check_hazards(run) {
        return;
    }

    // Fireballs
    for projectile in run.projectiles.iter_mut() {
        projectile.advance(dt);
    }
    run.projectiles.retain(|p| !p.is_dead());
    collision::check_projectiles(run);

    // Pickup
    spawner::try_spawn_pickup(run);
    if let Some(orb) = run.pickup.as_mut() {
        orb.advance(modifiers.scroll_speed, dt);
        if orb.is_offscreen() {
            run.pickup = None;
        }
    }
    collision::check_pickup(run);

    // Buffs
    for kind in run.powerups.update(dt) {
        run.push_event(GameEvent::PowerUpExpired { kind });
    }

    update_particles(&mut run.particles, dt);
}

/// Launch a fireball if the cooldown allows
fn try_fire(run: &mut RunState, modifiers: &EffectiveModifiers) -> bool {
    if run.fire_cooldown > 0.0 {
        return false;
    }
    let avatar = run.avatar;
    let id = run.next_entity_id();
    run.projectiles.push(Projectile {
        id,
        pos: avatar.pos + Vec2::new(avatar.radius + 4.0, 0.0),
        vel_x: PROJECTILE_SPEED,
        radius: PROJECTILE_RADIUS + modifiers.fireball_radius_bonus,
        life: PROJECTILE_LIFETIME,
        pierce: modifiers.pierce_bonus,
    });
    run.fire_cooldown = FIRE_COOLDOWN * modifiers.fire_cooldown_multiplier;
    run.push_event(GameEvent::Fired);
    true
}

/// Demo-mode input: steer toward the next gap, shoot meteors ahead
pub fn autopilot_input(run: &RunState) -> TickInput {
    let avatar = run.avatar;

    let target_y = run
        .obstacles
        .iter()
        .find(|o| o.trailing_edge() + avatar.radius > avatar.pos.x)
        .map(|o| o.gap_center + o.gap_size * 0.15)
        .unwrap_or(GROUND_Y * 0.5);

    // Predict where we'll be a few frames out before deciding to flap
    let lookahead = avatar.pos.y + avatar.vel_y * 0.12;
    let flap = lookahead > target_y && avatar.vel_y > -120.0;

    let fire = run.fire_cooldown <= 0.0
        && run.hazards.iter().any(|h| {
            h.pos.x > avatar.pos.x && (h.pos.y - avatar.pos.y).abs() < h.radius + PROJECTILE_RADIUS
        });

    TickInput { flap, fire }
}
