//! Entity spawn factories and round setup.
//!
//! Players, bosses and minions all carry the full combatant bundle so the
//! status, damage and snapshot systems can treat them uniformly.

use std::collections::BTreeMap;
use std::f32::consts::PI;

use glam::Vec2;
use hecs::{Entity, World};

use tankduel_boss_ai::profiles::get_profile;
use tankduel_core::components::*;
use tankduel_core::constants::*;
use tankduel_core::enums::*;

use crate::components::{Behavior, BossBrain, Controls, MinionBrain, Projectile};
use crate::effects::{EffectPayload, StatusEffects};
use crate::obstacles::ObstacleField;
use crate::state::SimulationState;
use crate::systems::status;

/// Spawn a player tank at its slot's spawn point.
pub fn spawn_player(world: &mut World, sim: &SimulationState, slot: PlayerSlot) -> Entity {
    let pos = sim.player_spawns()[slot.index()];
    world.spawn((
        Combatant::new(Team::Player(slot)),
        Kinematics::at(pos, spawn_heading(slot)),
        Collider::new(TANK_RADIUS),
        Health::new(TANK_MAX_HP),
        Ammo::new(TANK_MAX_AMMO, TANK_RELOAD_RATE),
        Mobility::default(),
        WeaponTraits::default(),
        Weapon::default(),
        BossBuffStats::default(),
        Defense::default(),
        Visibility::default(),
        StatusEffects::new(),
        Behavior::PlayerControlled { slot },
        Controls {
            scheme: sim.config.control_schemes[slot.index()],
            charge: ChargeState::Idle,
        },
    ))
}

fn spawn_heading(slot: PlayerSlot) -> f32 {
    match slot {
        PlayerSlot::One => 0.0,
        PlayerSlot::Two => PI,
    }
}

/// Spawn a boss of `archetype` at the boss spawn point.
pub fn spawn_boss(world: &mut World, sim: &SimulationState, archetype: BossArchetype) -> Entity {
    let profile = get_profile(archetype);
    let now = sim.clock.now_ms;
    let mobility = Mobility {
        friction: profile.friction,
        accel: profile.accel,
        max_speed: profile.max_speed,
        move_speed: profile.max_speed,
        ..Mobility::default()
    };
    let weapon = Weapon {
        damage: profile.bullet_damage,
        bullet_speed: BOSS_BULLET_SPEED,
        bullet_radius: BOSS_BULLET_RADIUS,
        damage_mult: 1.0,
    };
    log::info!("boss {:?} enters the arena", archetype);
    world.spawn((
        Combatant::new(Team::Boss),
        Kinematics::at(sim.boss_spawn(), PI),
        Collider::new(profile.radius),
        Health::new(profile.max_hp),
        Ammo::new(0, 0.0),
        mobility,
        WeaponTraits::default(),
        weapon,
        BossBuffStats::default(),
        Defense::default(),
        Visibility::default(),
        StatusEffects::new(),
        Behavior::BossAi,
        BossBrain::new(archetype, now, BOSS_FIRST_CAST_DELAY_MS),
    ))
}

/// Minion stats differ between brood spawn and split minis.
#[derive(Debug, Clone, Copy)]
pub struct MinionSpec {
    pub hp: f32,
    pub radius: f32,
    pub damage: f32,
}

impl MinionSpec {
    pub const BROOD: MinionSpec = MinionSpec {
        hp: MINION_HP,
        radius: MINION_RADIUS,
        damage: MINION_BULLET_DAMAGE,
    };

    pub const SPLIT_MINI: MinionSpec = MinionSpec {
        hp: SPLIT_MINI_HP,
        radius: SPLIT_MINI_RADIUS,
        damage: BOSS_BULLET_DAMAGE * 0.6,
    };
}

pub fn spawn_minion(world: &mut World, sim: &SimulationState, parent: Entity, pos: Vec2, spec: MinionSpec) -> Entity {
    let now = sim.clock.now_ms;
    let pos = sim.clamp_to_arena(pos, spec.radius);
    let weapon = Weapon {
        damage: spec.damage,
        bullet_speed: BOSS_BULLET_SPEED,
        bullet_radius: BOSS_BULLET_RADIUS * 0.75,
        damage_mult: 1.0,
    };
    world.spawn((
        Combatant::new(Team::Boss),
        Kinematics::at(pos, 0.0),
        Collider::new(spec.radius),
        Health::new(spec.hp),
        Ammo::new(0, 0.0),
        Mobility::default(),
        WeaponTraits::default(),
        weapon,
        BossBuffStats::default(),
        Defense::default(),
        Visibility::default(),
        StatusEffects::new(),
        Behavior::Minion { parent },
        MinionBrain {
            // Stagger the first volley so a fresh brood does not fire in unison.
            next_fire_at_ms: now + MINION_FIRE_INTERVAL_MS * 0.5 + pos.x as f64 % 300.0,
        },
    ))
}

/// Spawn points obstacles must keep clear of this round.
fn spawn_points(sim: &SimulationState) -> Vec<Vec2> {
    let mut points = sim.player_spawns().to_vec();
    if sim.mode() == GameMode::VsBoss {
        points.push(sim.boss_spawn());
    }
    points
}

/// Regenerate the obstacle field for a new round.
pub fn regenerate_obstacles(sim: &mut SimulationState) {
    let spawns = spawn_points(sim);
    sim.obstacles = ObstacleField::generate(&sim.config.obstacles, &sim.bounds, &spawns, &mut sim.rng);
}

/// Fresh world for a new match: both players, the field and (in boss mode)
/// the first boss.
pub fn setup_match(world: &mut World, sim: &mut SimulationState, boss: Option<BossArchetype>) {
    world.clear();
    sim.pickups.clear();
    sim.hazards.clear();
    sim.scheduler.clear();
    sim.fire_requests.clear();
    sim.wall_impacts.clear();
    sim.round = 1;
    regenerate_obstacles(sim);
    for slot in PlayerSlot::ALL {
        spawn_player(world, sim, slot);
    }
    if let Some(archetype) = boss.filter(|_| sim.mode() == GameMode::VsBoss) {
        spawn_boss(world, sim, archetype);
    }
    sim.next_pickup_at_ms = sim.clock.now_ms + sim.config.pickup_interval_ms;
    log::info!("match started: {:?}, round {}", sim.mode(), sim.round);
}

/// Reset the arena after a round ends.
///
/// Bullets, bosses and minions are despawned; pickups, hazards and pending
/// events are cleared. Every player has its effects torn down and is
/// revived at its spawn with full HP and ammo. The obstacle field is
/// regenerated. In boss mode the retained boss buffs are reapplied and
/// `boss` is spawned.
pub fn reset_after_kill(
    world: &mut World,
    sim: &mut SimulationState,
    retained: &[Vec<BossBuff>; 2],
    boss: Option<BossArchetype>,
) {
    let mut doomed: Vec<Entity> = world.query::<&Projectile>().iter().map(|(e, _)| e).collect();
    doomed.extend(
        world
            .query::<&Behavior>()
            .iter()
            .filter(|(_, b)| !matches!(b, Behavior::PlayerControlled { .. }))
            .map(|(e, _)| e),
    );
    for entity in doomed {
        let _ = world.despawn(entity);
    }
    sim.pickups.clear();
    sim.hazards.clear();
    sim.scheduler.clear();
    sim.fire_requests.clear();
    sim.wall_impacts.clear();
    sim.round += 1;
    regenerate_obstacles(sim);

    let players: Vec<(Entity, PlayerSlot)> = world
        .query::<&Behavior>()
        .iter()
        .filter_map(|(e, b)| match *b {
            Behavior::PlayerControlled { slot } => Some((e, slot)),
            _ => None,
        })
        .collect();
    let spawns = sim.player_spawns();
    let now = sim.clock.now_ms;

    for &(entity, slot) in &players {
        status::reset_effects(world, entity);
        if let Ok((combatant, kin, collider, health, ammo, mobility, traits, buffs, defense, visibility, controls)) =
            world.query_one_mut::<(
                &mut Combatant,
                &mut Kinematics,
                &mut Collider,
                &mut Health,
                &mut Ammo,
                &mut Mobility,
                &mut WeaponTraits,
                &mut BossBuffStats,
                &mut Defense,
                &mut Visibility,
                &mut Controls,
            )>(entity)
        {
            *combatant = Combatant::new(Team::Player(slot));
            *kin = Kinematics::at(spawns[slot.index()], spawn_heading(slot));
            *collider = Collider::new(collider.base_radius);
            health.reset_to(health.max_hp);
            ammo.refill();
            ammo.reload_mult = 1.0;
            *mobility = Mobility::default();
            *traits = WeaponTraits::default();
            *buffs = BossBuffStats::default();
            *defense = Defense::default();
            *visibility = Visibility::default();
            controls.charge = ChargeState::Idle;
        }
    }

    if sim.mode() == GameMode::VsBoss {
        for &(entity, slot) in &players {
            reapply_blessings(world, entity, &retained[slot.index()], now);
        }
        if let Some(archetype) = boss {
            spawn_boss(world, sim, archetype);
        }
    }

    sim.next_pickup_at_ms = now + sim.config.pickup_interval_ms;
    log::info!("round {} begins", sim.round);
}

/// Apply each retained buff once, with its stack count.
pub fn reapply_blessings(world: &mut World, entity: Entity, retained: &[BossBuff], now_ms: f64) {
    let mut counts: BTreeMap<BossBuff, u32> = BTreeMap::new();
    for &buff in retained {
        *counts.entry(buff).or_default() += 1;
    }
    for (buff, stacks) in counts {
        status::apply_effect(
            world,
            entity,
            EffectKind::Blessing(buff),
            now_ms,
            None,
            EffectPayload::Blessing { stacks },
        );
    }
}
