//! Buff pickups: timed spawning, magnet pull and collection.

use glam::Vec2;
use hecs::{Entity, World};
use rand::seq::SliceRandom;
use rand::Rng;

use tankduel_core::components::{BossBuffStats, Collider, Combatant, Kinematics};
use tankduel_core::constants::*;
use tankduel_core::enums::{EffectKind, PickupKind};
use tankduel_core::types::Color;

use crate::components::Behavior;
use crate::state::SimulationState;
use crate::systems::status;

const SPAWN_ATTEMPTS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pickup {
    pub kind: PickupKind,
    pub pos: Vec2,
    pub radius: f32,
    /// Cleared when collected; compacted by cleanup.
    pub active: bool,
}

/// Status effect a pickup grants.
pub fn effect_for(kind: PickupKind) -> EffectKind {
    match kind {
        PickupKind::Heal => EffectKind::HealOverTime,
        PickupKind::SpeedBoost => EffectKind::SpeedBoost,
        PickupKind::Shrink => EffectKind::Shrink,
        PickupKind::Shield => EffectKind::Shield,
        PickupKind::RapidReload => EffectKind::RapidReload,
        PickupKind::Clone => EffectKind::Clone,
        PickupKind::Shotgun => EffectKind::Shotgun,
        PickupKind::Ricochet => EffectKind::Ricochet,
        PickupKind::Homing => EffectKind::Homing,
        PickupKind::BigBullet => EffectKind::BigBullet,
        PickupKind::Explosive => EffectKind::Explosive,
        PickupKind::Pierce => EffectKind::Pierce,
        PickupKind::Poison => EffectKind::PoisonAmmo,
        PickupKind::Trail => EffectKind::Trail,
        PickupKind::Fury => EffectKind::Fury,
        PickupKind::ElementalAmmo => EffectKind::ElementalAmmo,
        PickupKind::Invisibility => EffectKind::Invisibility,
        PickupKind::Giant => EffectKind::Giant,
        PickupKind::ReverseControls => EffectKind::ReverseControls,
        PickupKind::Root => EffectKind::Root,
        PickupKind::Silence => EffectKind::Silence,
        PickupKind::Possession => EffectKind::Possessed,
    }
}

/// Spawn timer and magnet pull.
pub fn run(world: &mut World, sim: &mut SimulationState) {
    let now = sim.clock.now_ms;
    if now >= sim.next_pickup_at_ms {
        sim.next_pickup_at_ms = now + sim.config.pickup_interval_ms;
        let live = sim.pickups.iter().filter(|p| p.active).count();
        if live < sim.config.max_live_pickups {
            let occupied = bodies(world);
            if let Some(pickup) = roll_pickup(sim, &occupied) {
                log::debug!("pickup {:?} spawned at {:?}", pickup.kind, pickup.pos);
                sim.pickups.push(pickup);
            }
        }
    }
    magnet(world, sim);
}

fn bodies(world: &World) -> Vec<(Vec2, f32)> {
    world
        .query::<(&Combatant, &Kinematics, &Collider)>()
        .iter()
        .filter(|(_, (c, _, _))| c.alive)
        .map(|(_, (_, k, col))| (k.pos, col.radius))
        .collect()
}

fn roll_pickup(sim: &mut SimulationState, occupied: &[(Vec2, f32)]) -> Option<Pickup> {
    let mode = sim.mode();
    let pool: Vec<PickupKind> = PickupKind::ALL
        .iter()
        .copied()
        .filter(|k| k.available_in(mode))
        .collect();
    let kind = *pool.choose(&mut sim.rng)?;

    let inset = PICKUP_RADIUS + TANK_RADIUS;
    let (min, max) = (
        Vec2::new(sim.bounds.left() + inset, sim.bounds.top() + inset),
        Vec2::new(sim.bounds.right() - inset, sim.bounds.bottom() - inset),
    );
    if max.x <= min.x || max.y <= min.y {
        return None;
    }
    (0..SPAWN_ATTEMPTS).find_map(|_| {
        let pos = Vec2::new(sim.rng.gen_range(min.x..max.x), sim.rng.gen_range(min.y..max.y));
        let clear = !sim.obstacles.blocks_circle(pos, PICKUP_RADIUS)
            && occupied
                .iter()
                .all(|&(p, r)| p.distance(pos) > r + PICKUP_RADIUS * 2.0)
            && sim
                .pickups
                .iter()
                .filter(|other| other.active)
                .all(|other| other.pos.distance(pos) > PICKUP_RADIUS * 4.0);
        clear.then_some(Pickup {
            kind,
            pos,
            radius: PICKUP_RADIUS,
            active: true,
        })
    })
}

/// Pull pickups toward players carrying magnet stacks.
fn magnet(world: &World, sim: &mut SimulationState) {
    let frames = sim.clock.frames();
    let magnets: Vec<(Vec2, f32)> = world
        .query::<(&Combatant, &Kinematics, &BossBuffStats)>()
        .iter()
        .filter(|(_, (c, _, b))| c.alive && b.magnet > 0)
        .map(|(_, (_, k, b))| (k.pos, b.magnet_radius()))
        .collect();
    for pickup in sim.pickups.iter_mut().filter(|p| p.active) {
        let nearest = magnets
            .iter()
            .filter(|(pos, radius)| pos.distance(pickup.pos) <= *radius)
            .min_by(|a, b| a.0.distance(pickup.pos).total_cmp(&b.0.distance(pickup.pos)));
        if let Some(&(owner, _)) = nearest {
            let offset = owner - pickup.pos;
            let step = MAGNET_PULL * frames;
            pickup.pos = if offset.length() <= step {
                owner
            } else {
                pickup.pos + offset.normalize() * step
            };
        }
    }
}

/// Overlap check between live players and active pickups.
pub fn collect(world: &mut World, sim: &mut SimulationState) {
    let players: Vec<(Entity, Vec2, f32)> = world
        .query::<(&Combatant, &Kinematics, &Collider, &Behavior)>()
        .iter()
        .filter(|(_, (c, _, _, b))| c.alive && matches!(b, Behavior::PlayerControlled { .. }))
        .map(|(e, (_, k, col, _))| (e, k.pos, col.radius))
        .collect();

    let mut grants: Vec<(Entity, PickupKind)> = Vec::new();
    for pickup in sim.pickups.iter_mut().filter(|p| p.active) {
        let collector = players
            .iter()
            .filter(|(_, pos, r)| pos.distance(pickup.pos) < r + pickup.radius)
            .min_by(|a, b| {
                a.1.distance(pickup.pos)
                    .total_cmp(&b.1.distance(pickup.pos))
                    .then(a.0.to_bits().cmp(&b.0.to_bits()))
            });
        if let Some(&(entity, _, _)) = collector {
            pickup.active = false;
            grants.push((entity, pickup.kind));
        }
    }

    for (collector, kind) in grants {
        apply_pickup(world, sim, collector, kind);
    }
}

/// Grant a pickup. Debuffs land on the collector's nearest opponent and are
/// lost if there is none.
pub fn apply_pickup(world: &mut World, sim: &mut SimulationState, collector: Entity, kind: PickupKind) -> Option<Entity> {
    let now = sim.clock.now_ms;
    let target = if kind.targets_opponent() {
        nearest_opponent(world, sim, collector)?
    } else {
        collector
    };
    let effect = effect_for(kind);
    if !status::apply_standard(world, target, effect, now) {
        return None;
    }
    let color = if kind.targets_opponent() {
        Color::RED
    } else {
        Color::GREEN
    };
    status::show_status(sim, target, effect.label(), color);
    Some(target)
}

/// Nearest living opponent, visible or not.
fn nearest_opponent(world: &World, sim: &SimulationState, of: Entity) -> Option<Entity> {
    let (team, from) = {
        let mut q = world.query_one::<(&Combatant, &Kinematics)>(of).ok()?;
        let (c, k) = q.get()?;
        (c.team, k.pos)
    };
    world
        .query::<(&Combatant, &Kinematics)>()
        .iter()
        .filter(|(e, (c, _))| *e != of && c.alive && !c.intangible && sim.hostile(team, c.team))
        .map(|(e, (_, k))| (e, k.pos.distance_squared(from)))
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.to_bits().cmp(&b.0.to_bits())))
        .map(|(e, _)| e)
}
