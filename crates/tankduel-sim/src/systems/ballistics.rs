//! Bullet ballistics: homing, swept wall/boundary collision, wall pierce,
//! bounces, explosive detonation and shot-split on impact.
//!
//! Each bullet's motion for the tick is split into sub-segments at every
//! contact. The end point of each sub-segment is recorded in
//! `Projectile::trace` so the damage system can test targets along the
//! bent path rather than only at the final position.

use glam::Vec2;
use hecs::World;

use tankduel_core::constants::*;
use tankduel_core::enums::GameMode;
use tankduel_geometry::{angle_delta, circle_rect_overlap, segment_bounds_sweep, Rect, SweepHit};

use crate::components::{Projectile, SplitCharge};
use crate::obstacles::ObstacleField;
use crate::state::SimulationState;
use crate::systems::targeting::{self, Body};

/// Terminal wall or boundary contact. Settled by the damage pass once
/// target contacts earlier on the path are known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Impact {
    Explode { pos: Vec2 },
    Split { pos: Vec2, heading: f32 },
}

pub fn run(world: &mut World, sim: &mut SimulationState) {
    let now = sim.clock.now_ms;
    let frames = sim.clock.frames();
    let mode = sim.mode();
    let bodies = targeting::bodies(world);

    let mut impacts: Vec<Impact> = Vec::new();
    for (entity, p) in world.query_mut::<&mut Projectile>() {
        if !p.alive {
            continue;
        }
        p.prev_pos = p.pos;
        p.trace.clear();
        if now >= p.expires_at_ms {
            p.alive = false;
            p.pierce_left = 0;
            continue;
        }
        if p.homing {
            steer_homing(p, &bodies, mode, now, frames);
        }
        advance(p, &sim.obstacles, &sim.bounds, frames, &mut impacts);
        sim.wall_impacts.extend(impacts.drain(..).map(|impact| (entity, impact)));
    }
}

/// Turn a homing bullet toward the nearest valid target.
///
/// Homing switches off `HOMING_DURATION_MS` after spawn. The turn per tick
/// is clamped to `HOMING_MAX_TURN` per frame; while the bullet is still
/// within `HOMING_OWNER_GUARD_RADIUS` of its owner and would need to turn
/// more than `HOMING_SELF_AVOID_ANGLE`, only a quarter of the clamped turn
/// is applied so a fresh bullet cannot swing back through its own tank.
/// Returns the heading change applied.
pub fn steer_homing(p: &mut Projectile, bodies: &[Body], mode: GameMode, now_ms: f64, frames: f32) -> f32 {
    if now_ms - p.spawned_at_ms >= HOMING_DURATION_MS {
        p.homing = false;
        p.homing_target = None;
        return 0.0;
    }

    let current = p
        .homing_target
        .and_then(|t| targeting::still_valid(bodies, mode, p.owner_team, t))
        .filter(|b| b.entity != p.owner);
    let target = match current {
        Some(body) => body,
        None => {
            match targeting::nearest_hostile(bodies, mode, p.owner_team, p.pos, Some(p.owner)) {
                Some(body) => body,
                None => {
                    p.homing_target = None;
                    return 0.0;
                }
            }
        }
    };
    p.homing_target = Some(target.entity);

    let to_target = target.pos - p.pos;
    let speed = p.vel.length();
    if to_target.length_squared() <= f32::EPSILON || speed <= f32::EPSILON {
        return 0.0;
    }
    let heading = p.heading();
    let wanted = angle_delta(heading, to_target.y.atan2(to_target.x));
    let max_turn = HOMING_MAX_TURN * frames;
    let mut turn = wanted.clamp(-max_turn, max_turn);

    let near_owner = bodies
        .iter()
        .find(|b| b.entity == p.owner)
        .is_some_and(|owner| owner.pos.distance(p.pos) < HOMING_OWNER_GUARD_RADIUS);
    if near_owner && wanted.abs() > HOMING_SELF_AVOID_ANGLE {
        turn *= HOMING_SELF_AVOID_FACTOR;
    }

    p.vel = Vec2::from_angle(heading + turn) * speed;
    turn
}

/// Move a bullet through this tick's travel, resolving every contact.
pub fn advance(
    p: &mut Projectile,
    obstacles: &ObstacleField,
    bounds: &Rect,
    frames: f32,
    impacts: &mut Vec<Impact>,
) {
    let mut remaining = p.vel * frames;
    let mut iterations = 0;

    while p.alive && remaining.length_squared() > 1e-8 && iterations < MAX_SWEEP_ITERATIONS {
        iterations += 1;
        let from = p.pos;
        let to = from + remaining;

        // Leave the phasing state once clear of the wall being passed.
        if let Some(i) = p.phasing {
            let still_inside = obstacles
                .obstacles
                .get(i)
                .is_some_and(|o| circle_rect_overlap(from, p.radius + BOUNCE_NUDGE, &o.rect));
            if !still_inside {
                p.phasing = None;
            }
        }

        let Some((obstacle, hit)) = earliest_contact(p, obstacles, bounds, from, to) else {
            p.pos = to;
            p.trace.push(to);
            break;
        };
        p.pos = hit.point;
        p.trace.push(hit.point);
        let leftover = to - hit.point;

        if p.explosive {
            impacts.push(Impact::Explode { pos: hit.point });
            p.alive = false;
            break;
        }

        if let Some(i) = obstacle {
            if p.wall_pierce > 1 {
                p.wall_pierce -= 1;
                p.phasing = Some(i);
                remaining = leftover;
                continue;
            }
        }

        if let SplitCharge::Armed(_) = p.split {
            impacts.push(Impact::Split {
                pos: hit.point,
                heading: p.heading(),
            });
            p.alive = false;
            break;
        }

        if p.bounces >= p.max_bounces {
            p.alive = false;
            break;
        }

        let normal = hit.edge.normal();
        // Obstacle edges face out of the wall; arena edges face out of the arena.
        let away = if obstacle.is_some() { normal } else { -normal };
        remaining = leftover;
        if hit.edge.is_vertical() {
            p.vel.x = -p.vel.x;
            remaining.x = -remaining.x;
        } else {
            p.vel.y = -p.vel.y;
            remaining.y = -remaining.y;
        }
        p.pos += away * BOUNCE_NUDGE;
        p.bounces += 1;
        if let Some(factor) = p.bounce_damage_factor {
            if p.bounce_budget > 0 {
                p.damage *= factor;
                p.bounce_budget -= 1;
            }
        }
    }
}

/// Earliest of the nearest obstacle contact and the arena boundary
/// contact. `Some(index)` marks an obstacle; ties go to the obstacle.
fn earliest_contact(
    p: &Projectile,
    obstacles: &ObstacleField,
    bounds: &Rect,
    from: Vec2,
    to: Vec2,
) -> Option<(Option<usize>, SweepHit)> {
    let wall = obstacles.first_hit(from, to, p.radius, p.phasing);
    let edge = segment_bounds_sweep(from, to, bounds, p.radius);
    match (wall, edge) {
        (Some((i, w)), Some(e)) if w.t <= e.t => Some((Some(i), w)),
        (_, Some(e)) => Some((None, e)),
        (Some((i, w)), None) => Some((Some(i), w)),
        (None, None) => None,
    }
}
