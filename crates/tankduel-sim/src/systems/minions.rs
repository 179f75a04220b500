//! Minions: brood spawn and split minis. Chase the nearest player and fire
//! on a fixed interval.

use glam::Vec2;
use hecs::{Entity, World};

use tankduel_core::components::*;
use tankduel_core::constants::*;
use tankduel_core::enums::Team;
use tankduel_core::events::FxEvent;

use crate::components::{Behavior, MinionBrain, Projectile};
use crate::state::SimulationState;
use crate::systems::{firing, tank_physics, targeting};

/// Keep this far from the target instead of ramming it.
const MINION_STANDOFF: f32 = 60.0;

pub fn run(world: &mut World, sim: &mut SimulationState) {
    let now = sim.clock.now_ms;
    let frames = sim.clock.frames();
    let mode = sim.mode();
    let bodies = targeting::bodies(world);

    let mut shots: Vec<Projectile> = Vec::new();
    for (entity, (behavior, combatant, brain, kin, mobility, collider, weapon, traits)) in world.query_mut::<(
        &Behavior,
        &Combatant,
        &mut MinionBrain,
        &mut Kinematics,
        &Mobility,
        &Collider,
        &Weapon,
        &WeaponTraits,
    )>() {
        if !matches!(behavior, Behavior::Minion { .. }) || !combatant.alive || combatant.intangible {
            continue;
        }
        let Some(target) = targeting::nearest_hostile(&bodies, mode, Team::Boss, kin.pos, Some(entity)) else {
            kin.vel = Vec2::ZERO;
            continue;
        };
        let offset = target.pos - kin.pos;
        let distance = offset.length();
        if distance > f32::EPSILON {
            kin.heading = offset.y.atan2(offset.x);
        }

        let can_move = !mobility.rooted && !mobility.stunned;
        kin.vel = if can_move && distance > MINION_STANDOFF + target.radius {
            Vec2::from_angle(kin.heading) * MINION_SPEED * mobility.effective_speed_mult()
        } else {
            Vec2::ZERO
        };
        tank_physics::integrate(sim, kin, collider.radius, frames);

        if now >= brain.next_fire_at_ms {
            brain.next_fire_at_ms = now + MINION_FIRE_INTERVAL_MS;
            if mobility.stunned || traits.silenced {
                continue;
            }
            let muzzle = kin.pos + Vec2::from_angle(kin.heading) * (collider.radius + BOSS_BULLET_RADIUS);
            shots.push(firing::enemy_bullet(
                entity,
                muzzle,
                kin.heading,
                BOSS_BULLET_SPEED,
                weapon.damage * weapon.damage_mult,
                weapon.bullet_radius,
                now,
            ));
            sim.fx.push(FxEvent::MuzzleFlash {
                pos: muzzle,
                heading: kin.heading,
            });
        }
    }

    for shot in shots {
        world.spawn((shot,));
    }
}

/// Living minions linked to `parent`.
pub fn alive_count(world: &World, parent: Entity) -> u32 {
    world
        .query::<(&Behavior, &Combatant)>()
        .iter()
        .filter(|(_, (b, c))| c.alive && **b == Behavior::Minion { parent })
        .count() as u32
}
