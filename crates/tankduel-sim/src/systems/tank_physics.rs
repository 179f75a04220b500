//! Player tank control and movement, obstacle sliding, arena clamping and
//! tank-vs-tank separation.

use glam::Vec2;
use hecs::{Entity, World};
use rand::Rng;

use tankduel_core::commands::{FrameInput, TankInput};
use tankduel_core::components::*;
use tankduel_core::config::PossessionTuning;
use tankduel_core::constants::*;
use tankduel_core::enums::ControlScheme;
use tankduel_geometry::circle_circle_overlap;

use crate::components::{Behavior, Controls};
use crate::obstacles::ObstacleField;
use crate::state::SimulationState;
use crate::systems::targeting;

/// How a move request was resolved against the obstacle field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideResult {
    Free,
    /// Only the vertical component fitted.
    SlidY,
    /// Only the horizontal component fitted.
    SlidX,
    /// Nothing fitted; the body stays put.
    Blocked,
}

/// Move a circle by `delta`, sliding along walls: the full move first, then
/// Y-only, then X-only.
pub fn move_with_slide(field: &ObstacleField, pos: Vec2, delta: Vec2, radius: f32) -> (Vec2, SlideResult) {
    if delta == Vec2::ZERO {
        return (pos, SlideResult::Free);
    }
    let full = pos + delta;
    if !field.blocks_circle(full, radius) {
        return (full, SlideResult::Free);
    }
    let y_only = pos + Vec2::new(0.0, delta.y);
    if delta.y != 0.0 && !field.blocks_circle(y_only, radius) {
        return (y_only, SlideResult::SlidY);
    }
    let x_only = pos + Vec2::new(delta.x, 0.0);
    if delta.x != 0.0 && !field.blocks_circle(x_only, radius) {
        return (x_only, SlideResult::SlidX);
    }
    (pos, SlideResult::Blocked)
}

/// Swap opposite keys while controls are reversed.
pub fn effective_keys(keys: TankInput, reversed: bool) -> TankInput {
    if !reversed {
        return keys;
    }
    TankInput {
        forward: keys.back,
        back: keys.forward,
        left: keys.right,
        right: keys.left,
        fire: keys.fire,
    }
}

/// Manual steering: rotate with left/right, thrust along the heading,
/// friction every tick.
pub fn manual_step(kin: &mut Kinematics, mobility: &Mobility, keys: TankInput, speed_mult: f32, frames: f32) {
    if keys.left {
        kin.heading -= mobility.turn_rate * frames;
    }
    if keys.right {
        kin.heading += mobility.turn_rate * frames;
    }
    if keys.forward {
        kin.speed += mobility.accel * frames;
    }
    if keys.back {
        kin.speed -= mobility.accel * frames;
    }
    kin.speed *= mobility.friction.powf(frames);
    let cap = mobility.max_speed * speed_mult;
    kin.speed = kin.speed.clamp(-cap, cap);
    kin.vel = Vec2::from_angle(kin.heading) * kin.speed;
}

/// Focus steering: heading is set by the caller; keys give a screen-space
/// direction blended into velocity through friction.
pub fn focus_step(kin: &mut Kinematics, mobility: &Mobility, keys: TankInput, speed_mult: f32, frames: f32) {
    let axis = |neg: bool, pos: bool| (pos as i32 - neg as i32) as f32;
    let mut dir = Vec2::new(axis(keys.left, keys.right), axis(keys.forward, keys.back));
    if dir.length_squared() > 1.0 {
        dir = dir.normalize();
    }
    let wanted = dir * mobility.move_speed * speed_mult;
    let keep = mobility.friction.powf(frames);
    kin.vel = kin.vel * keep + wanted * (1.0 - keep);
    kin.speed = kin.vel.length();
}

/// Possessed steering: a three-way weighted roll each tick replaces the
/// player's keys. Accelerate, decelerate, or halve the rotation drift.
pub fn possessed_step<R: Rng + ?Sized>(
    kin: &mut Kinematics,
    mobility: &mut Mobility,
    tuning: &PossessionTuning,
    speed_mult: f32,
    frames: f32,
    rng: &mut R,
) {
    let roll: f64 = rng.gen();
    if roll < tuning.accelerate_chance {
        kin.speed += mobility.accel * frames;
        mobility.possession_drift = rng.gen_range(-POSSESSION_MAX_DRIFT..=POSSESSION_MAX_DRIFT);
    } else if roll < tuning.accelerate_chance + tuning.decelerate_chance {
        kin.speed -= mobility.accel * frames;
        mobility.possession_drift = rng.gen_range(-POSSESSION_MAX_DRIFT..=POSSESSION_MAX_DRIFT);
    } else {
        mobility.possession_drift *= 0.5;
    }
    kin.heading += mobility.possession_drift * frames;
    kin.speed *= mobility.friction.powf(frames);
    let cap = mobility.max_speed * speed_mult;
    kin.speed = kin.speed.clamp(-cap, cap);
    kin.vel = Vec2::from_angle(kin.heading) * kin.speed;
}

/// Integrate `kin.vel` with wall sliding, then clamp to the arena. A fully
/// blocked move reverses velocity at half magnitude.
pub fn integrate(sim: &SimulationState, kin: &mut Kinematics, radius: f32, frames: f32) {
    let (pos, result) = move_with_slide(&sim.obstacles, kin.pos, kin.vel * frames, radius);
    if result == SlideResult::Blocked {
        kin.vel = -kin.vel * OBSTACLE_BOUNCE_DAMPING;
        kin.speed = -kin.speed * OBSTACLE_BOUNCE_DAMPING;
    }
    kin.pos = sim.clamp_to_arena(pos, radius);
}

/// Player control for this tick.
pub fn run(world: &mut World, sim: &mut SimulationState, input: &FrameInput) {
    let frames = sim.clock.frames();
    let mode = sim.mode();
    let bodies = targeting::bodies(world);

    for (entity, (behavior, controls, combatant, kin, mobility, collider, buffs)) in world.query_mut::<(
        &Behavior,
        &Controls,
        &Combatant,
        &mut Kinematics,
        &mut Mobility,
        &Collider,
        &BossBuffStats,
    )>() {
        let Behavior::PlayerControlled { slot } = *behavior else {
            continue;
        };
        if !combatant.alive {
            continue;
        }
        if mobility.stunned {
            kin.speed = 0.0;
            kin.vel = Vec2::ZERO;
            continue;
        }

        let speed_mult = mobility.effective_speed_mult() * buffs.move_speed_mult();
        let keys = effective_keys(input.for_slot(slot), mobility.reversed);

        if mobility.possessed {
            possessed_step(kin, mobility, &sim.config.possession, speed_mult, frames, &mut sim.rng);
        } else {
            match controls.scheme {
                ControlScheme::Manual => manual_step(kin, mobility, keys, speed_mult, frames),
                ControlScheme::Focus => {
                    if let Some(target) =
                        targeting::nearest_hostile(&bodies, mode, combatant.team, kin.pos, Some(entity))
                    {
                        let to = target.pos - kin.pos;
                        if to.length_squared() > f32::EPSILON {
                            kin.heading = to.y.atan2(to.x);
                        }
                    }
                    focus_step(kin, mobility, keys, speed_mult, frames);
                }
            }
        }

        if mobility.rooted {
            kin.speed = 0.0;
            kin.vel = Vec2::ZERO;
        }
        integrate(sim, kin, collider.radius, frames);
    }
}

/// Push overlapping bodies apart, half the penetration each. Exactly
/// coincident bodies separate along a random axis.
pub fn separate(world: &mut World, sim: &mut SimulationState) {
    let bodies: Vec<(Entity, Vec2, f32)> = world
        .query::<(&Combatant, &Kinematics, &Collider)>()
        .iter()
        .filter(|(_, (c, _, _))| c.alive && !c.intangible)
        .map(|(e, (_, k, col))| (e, k.pos, col.radius))
        .collect();

    let mut pushes: Vec<(Entity, Vec2)> = Vec::new();
    for (i, &(a, pa, ra)) in bodies.iter().enumerate() {
        for &(b, pb, rb) in &bodies[i + 1..] {
            if !circle_circle_overlap(pa, ra, pb, rb) {
                continue;
            }
            let offset = pb - pa;
            let dist = offset.length();
            let normal = if dist > f32::EPSILON {
                offset / dist
            } else {
                Vec2::from_angle(sim.rng.gen_range(0.0..std::f32::consts::TAU))
            };
            let half = (ra + rb - dist) * 0.5;
            pushes.push((a, -normal * half));
            pushes.push((b, normal * half));
        }
    }

    for (entity, push) in pushes {
        let radius = world.get::<&Collider>(entity).map_or(TANK_RADIUS, |c| c.radius);
        if let Ok(mut kin) = world.get::<&mut Kinematics>(entity) {
            kin.pos = sim.clamp_to_arena(kin.pos + push, radius);
        }
    }
}
