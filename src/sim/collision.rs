//! Collision passes
//!
//! Checks run in a fixed order each tick: avatar boundaries, pillars, meteors,
//! fireballs against meteors, then the pickup orb. Every pass that can hurt
//! the avatar returns `true` once the run has ended so the tick can stop.

use glam::Vec2;

use super::geom::{circle_circle_overlap, circle_rect_overlap};
use super::powerup::Activation;
use super::state::{GameEvent, RunState, TerminationCause, palette};
use crate::consts::*;

/// Something that would end the run without a shield
#[derive(Debug, Clone, Copy, PartialEq)]
enum Impact {
    Ceiling,
    Ground,
    /// `clear_time`: seconds until the pillar has scrolled past the avatar
    Pillar { gap_center: f32, clear_time: f32 },
    Meteor { index: usize },
}

impl Impact {
    fn cause(&self) -> TerminationCause {
        match self {
            Impact::Ceiling => TerminationCause::Ceiling,
            Impact::Ground => TerminationCause::Ground,
            Impact::Pillar { .. } => TerminationCause::Pillar,
            Impact::Meteor { .. } => TerminationCause::Meteor,
        }
    }
}

/// Offer the impact to the shield; terminate if none is held.
/// Returns true if the run ended.
fn resolve_impact(run: &mut RunState, impact: Impact) -> bool {
    let cause = impact.cause();
    if !run.powerups.consume_shield() {
        run.terminate(cause);
        return true;
    }

    let avatar = &mut run.avatar;
    match impact {
        Impact::Ceiling => {
            avatar.pos.y = avatar.radius + 24.0;
            avatar.vel_y = 120.0;
        }
        Impact::Ground => {
            avatar.pos.y = GROUND_Y - avatar.radius - 48.0;
            avatar.vel_y = FLAP_IMPULSE;
        }
        Impact::Pillar { gap_center, .. } => {
            avatar.pos.y = gap_center;
            avatar.vel_y = FLAP_IMPULSE;
        }
        Impact::Meteor { index } => {
            if index < run.hazards.len() {
                run.hazards.remove(index);
            }
        }
    }

    // Grace must outlast the pillar still overlapping the avatar
    run.shield_grace = match impact {
        Impact::Pillar { clear_time, .. } => SHIELD_GRACE.max(clear_time),
        _ => SHIELD_GRACE,
    };
    let origin = run.avatar.pos;
    run.emit_burst(origin, palette::SHIELD, 18, 180.0);
    run.push_event(GameEvent::ShieldAbsorbed { cause });
    log::debug!(
        "Shield absorbed {} hit, {} charges left",
        cause.as_str(),
        run.powerups.shield_charges
    );
    false
}

/// Top edge and ground line
pub fn check_boundaries(run: &mut RunState) -> bool {
    if run.avatar.touches_ceiling() {
        return resolve_impact(run, Impact::Ceiling);
    }
    if run.avatar.touches_ground() {
        return resolve_impact(run, Impact::Ground);
    }
    false
}

/// Both halves of every pillar pair, then scoring
pub fn check_obstacles(run: &mut RunState) -> bool {
    if run.shield_grace <= 0.0 {
        let pos = run.avatar.pos;
        let radius = run.avatar.radius;
        let hit = run.obstacles.iter().find(|o| {
            circle_rect_overlap(pos, radius, &o.top_rect().inset(FAIRNESS_INSET))
                || circle_rect_overlap(pos, radius, &o.bottom_rect().inset(FAIRNESS_INSET))
        });
        if let Some(obstacle) = hit {
            let gap_center = obstacle.gap_center;
            let clear_distance = obstacle.trailing_edge() - (pos.x - radius);
            let clear_time = clear_distance.max(0.0) / run.modifiers.scroll_speed.max(1.0);
            if resolve_impact(run, Impact::Pillar { gap_center, clear_time }) {
                return true;
            }
        }
    }

    let leading_edge = run.avatar.pos.x + run.avatar.radius;
    let mut passed = Vec::new();
    for obstacle in run.obstacles.iter_mut() {
        if !obstacle.scored && obstacle.trailing_edge() <= leading_edge {
            obstacle.scored = true;
            passed.push(obstacle.id);
        }
    }
    for obstacle_id in passed {
        run.score += 1;
        let origin = run.avatar.pos;
        run.emit_burst(origin, palette::SCORE, 10, 120.0);
        run.push_event(GameEvent::Scored { obstacle_id });
    }
    false
}

/// Meteors against the avatar
pub fn check_hazards(run: &mut RunState) -> bool {
    if run.shield_grace > 0.0 {
        return false;
    }
    let pos = run.avatar.pos;
    let radius = run.avatar.radius;
    let hit = run
        .hazards
        .iter()
        .position(|h| circle_circle_overlap(pos, radius, h.pos, h.radius));
    match hit {
        Some(index) => resolve_impact(run, Impact::Meteor { index }),
        None => false,
    }
}

/// Fireballs against meteors
pub fn check_projectiles(run: &mut RunState) {
    let mut destroyed: Vec<(u32, Vec2)> = Vec::new();

    for projectile in run.projectiles.iter_mut() {
        for hazard in run.hazards.iter() {
            if projectile.life <= 0.0 {
                break;
            }
            if destroyed.iter().any(|(id, _)| *id == hazard.id) {
                continue;
            }
            if !circle_circle_overlap(projectile.pos, projectile.radius, hazard.pos, hazard.radius)
            {
                continue;
            }
            destroyed.push((hazard.id, hazard.pos));
            if projectile.pierce == 0 {
                projectile.life = 0.0;
            } else {
                projectile.pierce -= 1;
                projectile.life = projectile.life.max(PIERCE_LIFETIME_FLOOR);
            }
        }
    }

    if destroyed.is_empty() {
        return;
    }
    run.projectiles.retain(|p| p.life > 0.0);
    run.hazards
        .retain(|h| !destroyed.iter().any(|(id, _)| *id == h.id));

    for (_, pos) in destroyed {
        run.score += 1;
        run.kills += 1;
        run.shards.add(SHARDS_PER_METEOR);
        run.emit_burst(pos, palette::METEOR, 16, 200.0);
        run.push_event(GameEvent::MeteorDestroyed { pos });
    }
}

/// Avatar against the pickup orb
pub fn check_pickup(run: &mut RunState) {
    let Some(orb) = run.pickup else {
        return;
    };
    if !circle_circle_overlap(run.avatar.pos, run.avatar.radius, orb.position(), orb.radius) {
        return;
    }

    run.pickup = None;
    let outcome = run.powerups.activate(orb.kind);
    run.emit_burst(orb.position(), palette::PICKUP, 14, 150.0);
    if outcome != Activation::Rejected {
        run.push_event(GameEvent::PowerUpActivated { kind: orb.kind });
    }
}
