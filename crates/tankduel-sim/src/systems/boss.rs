//! Boss system: evaluates the boss FSM each tick, moves the body and
//! executes whatever skill it casts. Phase bookkeeping (split, merge,
//! corruption, defeat) runs separately once the tick's damage has settled.

use glam::Vec2;
use hecs::{Entity, World};
use rand::Rng;

use tankduel_boss_ai::easing::leap_position;
use tankduel_boss_ai::fsm::{evaluate, BossContext, BossMode};
use tankduel_boss_ai::phases::{entry_hp, phase_on_depletion, should_split};
use tankduel_boss_ai::profiles::get_profile;
use tankduel_core::components::*;
use tankduel_core::constants::*;
use tankduel_core::enums::{BossPhase, BossSkill, DamageKind, Easing, EffectKind, Team};
use tankduel_core::events::FxEvent;
use tankduel_core::types::Color;

use crate::components::{Behavior, BossBrain, LeapState, Projectile};
use crate::scheduler::{EventGuard, ScheduledAction};
use crate::state::SimulationState;
use crate::systems::hazards::HazardField;
use crate::systems::targeting::{self, Body};
use crate::systems::{damage, firing, minions, status, tank_physics};
use crate::world_setup::{self, MinionSpec};

pub fn run(world: &mut World, sim: &mut SimulationState) {
    let bosses: Vec<Entity> = world
        .query::<(&Behavior, &Combatant)>()
        .iter()
        .filter(|(_, (b, c))| **b == Behavior::BossAi && c.alive)
        .map(|(e, _)| e)
        .collect();
    for boss in bosses {
        update_boss(world, sim, boss);
    }
}

/// Boss numbers a skill reads at cast time.
#[derive(Debug, Clone, Copy)]
struct Caster {
    entity: Entity,
    pos: Vec2,
    radius: f32,
    damage: f32,
    phase: BossPhase,
}

impl Caster {
    fn aim_at(&self, target: Vec2) -> f32 {
        let to = target - self.pos;
        to.y.atan2(to.x)
    }

    fn muzzle(&self, heading: f32) -> Vec2 {
        self.pos + Vec2::from_angle(heading) * (self.radius + BOSS_BULLET_RADIUS)
    }

    fn bullet(&self, heading: f32, damage: f32, now_ms: f64) -> Projectile {
        firing::enemy_bullet(
            self.entity,
            self.muzzle(heading),
            heading,
            BOSS_BULLET_SPEED,
            damage,
            BOSS_BULLET_RADIUS,
            now_ms,
        )
    }
}

fn update_boss(world: &mut World, sim: &mut SimulationState, boss: Entity) {
    let now = sim.clock.now_ms;
    let frames = sim.clock.frames();

    let snapshot = world
        .query_one_mut::<(&BossBrain, &Kinematics, &Mobility, &Collider, &Combatant, &WeaponTraits, &Weapon)>(boss)
        .ok()
        .map(|(brain, kin, mobility, collider, combatant, traits, weapon)| {
            (
                brain.clone(),
                *kin,
                *mobility,
                collider.radius,
                combatant.intangible,
                traits.silenced,
                weapon.damage * weapon.damage_mult,
            )
        });
    let Some((mut brain, mut kin, mobility, radius, intangible, silenced, bullet_damage)) = snapshot else {
        return;
    };

    // The body sits out the split form.
    if intangible {
        kin.vel = Vec2::ZERO;
        write_back(world, boss, brain, kin);
        return;
    }

    if let Some(leap) = brain.leap {
        let elapsed = now - leap.started_at_ms;
        kin.vel = Vec2::ZERO;
        if elapsed >= leap.duration_ms {
            kin.pos = sim.clamp_to_arena(leap.target, radius);
            brain.leap = None;
            brain.casting = None;
            write_back(world, boss, brain, kin);
            land(world, sim, boss, &leap, kin.pos);
        } else {
            kin.pos = leap_position(leap.start, leap.target, elapsed, leap.duration_ms, leap.easing);
            write_back(world, boss, brain, kin);
        }
        return;
    }

    if brain.casting.is_some_and(|(_, until)| now >= until) {
        brain.casting = None;
    }
    if brain.defending_until_ms.is_some_and(|until| now >= until) {
        brain.defending_until_ms = None;
        if let Ok(mut defense) = world.get::<&mut Defense>(boss) {
            defense.damage_taken_mult = 1.0;
        }
    }

    let target = targeting::nearest_target(world, sim.mode(), Team::Boss, kin.pos, Some(boss));
    let mode = match (brain.casting, target) {
        (Some((skill, _)), _) => BossMode::CastingSkill(skill),
        (None, Some(_)) => BossMode::Chasing,
        (None, None) => BossMode::Idle,
    };
    let minions_alive = minions::alive_count(world, boss);
    let decision = evaluate(
        &BossContext {
            archetype: brain.archetype,
            phase: brain.phase,
            mode,
            pos: kin.pos,
            target: target.map(|t| t.pos),
            now_ms: now,
            next_cast_at_ms: brain.next_cast_at_ms,
            last_used: &brain.last_used,
            minions_alive,
        },
        &mut sim.rng,
    );

    if let Some(facing) = decision.facing {
        kin.heading = facing;
    }
    let can_move = !mobility.rooted && !mobility.stunned && brain.casting.is_none();
    if can_move {
        kin.vel += decision.accel * frames;
        kin.vel = kin
            .vel
            .clamp_length_max(mobility.max_speed * mobility.effective_speed_mult());
    } else {
        kin.vel = Vec2::ZERO;
    }
    kin.vel *= mobility.friction.powf(frames);
    tank_physics::integrate(sim, &mut kin, radius, frames);

    let cast = decision
        .cast
        .filter(|_| !mobility.stunned && !silenced)
        .zip(target);
    if let Some((skill, target)) = cast {
        let caster = Caster {
            entity: boss,
            pos: kin.pos,
            radius,
            damage: bullet_damage,
            phase: brain.phase,
        };
        write_back(world, boss, brain.clone(), kin);
        if execute(world, sim, &mut brain, &caster, skill, &target) {
            brain.last_used.insert(skill, now);
            brain.next_cast_at_ms = now + BOSS_CAST_GAP_MS;
            log::debug!("boss {:?} cast {:?}", brain.archetype, skill);
        }
        // Teleport moves the body; keep whatever position execution left.
        let kin = world.get::<&Kinematics>(boss).map(|k| *k).unwrap_or(kin);
        write_back(world, boss, brain, kin);
    } else {
        write_back(world, boss, brain, kin);
    }
}

fn write_back(world: &mut World, boss: Entity, brain: BossBrain, kin: Kinematics) {
    if let Ok((b, k)) = world.query_one_mut::<(&mut BossBrain, &mut Kinematics)>(boss) {
        *b = brain;
        *k = kin;
    }
}

/// Leap impact against whoever is inside the landing radius now.
fn land(world: &mut World, sim: &mut SimulationState, boss: Entity, leap: &LeapState, at: Vec2) {
    sim.fx.push(FxEvent::Explosion {
        pos: at,
        radius: leap.impact_radius,
        duration_ms: 400.0,
        color: Color::ORANGE,
        wave: true,
    });
    let hits = damage::area_damage(
        world,
        sim,
        at,
        leap.impact_radius,
        leap.damage,
        Team::Boss,
        Some(boss),
        DamageKind::Explosion,
    );
    log::debug!("{:?} landed at {:?}, {} hit", leap.skill, at, hits);
    if leap.skill == BossSkill::ChargeLeap {
        stun_caught(world, sim, at, leap.impact_radius);
    }
}

/// Stun every live hostile body the landing disc touches.
fn stun_caught(world: &mut World, sim: &mut SimulationState, at: Vec2, radius: f32) {
    let now = sim.clock.now_ms;
    let caught: Vec<Entity> = targeting::bodies(world)
        .into_iter()
        .filter(|b| b.alive && b.targetable && sim.hostile(Team::Boss, b.team))
        .filter(|b| b.pos.distance(at) <= radius + b.radius)
        .map(|b| b.entity)
        .collect();
    for entity in caught {
        if status::apply_standard(world, entity, EffectKind::Stun, now) {
            status::show_status(sim, entity, "STUNNED", Color::YELLOW);
        }
    }
}

/// Carry out one skill. Returns false when the skill could not happen at
/// all (no teleport destination); the cooldown is then left untouched.
fn execute(
    world: &mut World,
    sim: &mut SimulationState,
    brain: &mut BossBrain,
    caster: &Caster,
    skill: BossSkill,
    target: &Body,
) -> bool {
    let now = sim.clock.now_ms;
    match skill {
        BossSkill::GroundSlam => {
            sim.fx.push(FxEvent::Telegraph {
                pos: caster.pos,
                radius: GROUND_SLAM_RADIUS,
                duration_ms: TELEGRAPH_DELAY_MS,
                color: Color::RED,
            });
            sim.scheduler.schedule(
                now + TELEGRAPH_DELAY_MS,
                caster.entity,
                sim.round,
                EventGuard::OwnerInPhase(caster.phase),
                ScheduledAction::TelegraphStrike {
                    pos: caster.pos,
                    radius: GROUND_SLAM_RADIUS,
                    damage: GROUND_SLAM_DAMAGE,
                },
            );
            brain.casting = Some((skill, now + TELEGRAPH_DELAY_MS));
            true
        }
        BossSkill::Fortify => {
            brain.defending_until_ms = Some(now + FORTIFY_MS);
            if let Ok(mut defense) = world.get::<&mut Defense>(caster.entity) {
                defense.damage_taken_mult = FORTIFY_DAMAGE_TAKEN;
            }
            status::show_status(sim, caster.entity, "FORTIFY", Color::GREY);
            true
        }
        BossSkill::Leap | BossSkill::ChargeLeap => {
            let landing = sim.clamp_to_arena(target.pos, caster.radius);
            let easing = if skill == BossSkill::ChargeLeap {
                Easing::ChargeThenLeap
            } else {
                Easing::EaseInOut
            };
            sim.fx.push(FxEvent::Telegraph {
                pos: landing,
                radius: LEAP_IMPACT_RADIUS,
                duration_ms: LEAP_DURATION_MS,
                color: Color::ORANGE,
            });
            brain.leap = Some(LeapState {
                skill,
                start: caster.pos,
                target: landing,
                started_at_ms: now,
                duration_ms: LEAP_DURATION_MS,
                easing,
                impact_radius: LEAP_IMPACT_RADIUS,
                damage: LEAP_DAMAGE,
            });
            brain.casting = Some((skill, now + LEAP_DURATION_MS));
            true
        }
        BossSkill::AimedVolley => {
            sim.scheduler.schedule(
                now,
                caster.entity,
                sim.round,
                EventGuard::OwnerAlive,
                ScheduledAction::DelayedVolley {
                    shots_left: VOLLEY_SHOTS,
                    interval_ms: VOLLEY_INTERVAL_MS,
                },
            );
            brain.casting = Some((skill, now + VOLLEY_INTERVAL_MS * VOLLEY_SHOTS as f64));
            true
        }
        BossSkill::Teleport => teleport(world, sim, caster),
        BossSkill::SpawnBrood => {
            let spawned = spawn_ring(
                world,
                sim,
                caster.entity,
                caster.pos,
                caster.radius,
                BROOD_SIZE,
                MinionSpec::BROOD,
            );
            brain.brood_pending = spawned > 0;
            status::show_status(sim, caster.entity, "BROOD", Color::TOXIC);
            true
        }
        BossSkill::AcidPool => {
            lay_hazard(sim, target.pos, ACID_POOL_RADIUS, ACID_POOL_MS, ACID_POOL_DPS, Color::TOXIC);
            true
        }
        BossSkill::SplitterShot => {
            let aim = caster.aim_at(target.pos);
            for heading in firing::fan(aim, SPLITTER_SHOT_SPREAD, SPLITTER_SHOT_COUNT) {
                world.spawn((caster.bullet(heading, caster.damage, now),));
            }
            sim.fx.push(FxEvent::MuzzleFlash {
                pos: caster.muzzle(aim),
                heading: aim,
            });
            true
        }
        BossSkill::ShadowBolt => {
            let aim = caster.aim_at(target.pos);
            let mut bolt = caster.bullet(aim, caster.damage * SHADOW_BOLT_DAMAGE_MULT, now);
            bolt.homing = true;
            bolt.homing_target = Some(target.entity);
            world.spawn((bolt,));
            true
        }
        BossSkill::CorruptedNova => {
            let offset = caster.aim_at(target.pos);
            for heading in firing::ring(NOVA_BULLETS, offset) {
                world.spawn((caster.bullet(heading, caster.damage, now),));
            }
            sim.fx.push(FxEvent::Explosion {
                pos: caster.pos,
                radius: caster.radius * 2.0,
                duration_ms: 300.0,
                color: Color::PURPLE,
                wave: true,
            });
            true
        }
        BossSkill::BlightField => {
            lay_hazard(sim, target.pos, BLIGHT_RADIUS, BLIGHT_MS, BLIGHT_DPS, Color::PURPLE);
            for _ in 1..BLIGHT_FIELDS {
                let angle = sim.rng.gen_range(-std::f32::consts::PI..std::f32::consts::PI);
                let dist = sim.rng.gen_range(BLIGHT_RADIUS..BLIGHT_RADIUS * 2.5);
                let pos = target.pos + Vec2::from_angle(angle) * dist;
                lay_hazard(sim, pos, BLIGHT_RADIUS, BLIGHT_MS, BLIGHT_DPS, Color::PURPLE);
            }
            true
        }
    }
}

fn lay_hazard(sim: &mut SimulationState, pos: Vec2, radius: f32, duration_ms: f64, dps: f32, color: Color) {
    let pos = sim.clamp_to_arena(pos, 0.0);
    sim.hazards.push(HazardField {
        pos,
        radius,
        expires_at_ms: sim.clock.now_ms + duration_ms,
        dps,
        slow_factor: HAZARD_SLOW,
        faction: Team::Boss,
    });
    sim.fx.push(FxEvent::Explosion {
        pos,
        radius,
        duration_ms: 300.0,
        color,
        wave: true,
    });
}

/// Random obstacle-free spot away from every live player.
fn teleport(world: &mut World, sim: &mut SimulationState, caster: &Caster) -> bool {
    let players: Vec<Vec2> = targeting::bodies(world)
        .iter()
        .filter(|b| b.alive && !b.team.is_boss())
        .map(|b| b.pos)
        .collect();
    for _ in 0..TELEPORT_ATTEMPTS {
        let raw = Vec2::new(
            sim.bounds.left() + sim.rng.gen::<f32>() * sim.bounds.w,
            sim.bounds.top() + sim.rng.gen::<f32>() * sim.bounds.h,
        );
        let candidate = sim.clamp_to_arena(raw, caster.radius);
        if sim.obstacles.blocks_circle(candidate, caster.radius)
            || players
                .iter()
                .any(|p| p.distance(candidate) < TELEPORT_MIN_PLAYER_DISTANCE)
        {
            continue;
        }
        for pos in [caster.pos, candidate] {
            sim.fx.push(FxEvent::Explosion {
                pos,
                radius: caster.radius * 1.5,
                duration_ms: 250.0,
                color: Color::PURPLE,
                wave: true,
            });
        }
        if let Ok(mut kin) = world.get::<&mut Kinematics>(caster.entity) {
            kin.pos = candidate;
            kin.vel = Vec2::ZERO;
        }
        return true;
    }
    log::debug!("teleport found no destination after {} attempts", TELEPORT_ATTEMPTS);
    false
}

/// Spawn up to `count` minions evenly around `center`, skipping ring slots
/// that land inside a wall. Returns how many spawned.
pub fn spawn_ring(
    world: &mut World,
    sim: &SimulationState,
    parent: Entity,
    center: Vec2,
    parent_radius: f32,
    count: u32,
    spec: MinionSpec,
) -> u32 {
    let distance = parent_radius + spec.radius + 20.0;
    let mut spawned = 0;
    for heading in firing::ring(count, 0.0) {
        let pos = sim.clamp_to_arena(center + Vec2::from_angle(heading) * distance, spec.radius);
        if sim.obstacles.blocks_circle(pos, spec.radius) {
            continue;
        }
        world_setup::spawn_minion(world, sim, parent, pos, spec);
        spawned += 1;
    }
    if spawned < count {
        log::debug!("ring spawned {spawned} of {count} minions");
    }
    spawned
}

/// Switch a boss into `to`. Re-entering the current phase does nothing and
/// returns false.
///
/// On a real change the HP pool is reset to the phase's entry value, the
/// cooldown table is wiped, any cast, leap or fortify window is dropped and
/// the boss turns invulnerable for `PHASE_TRANSITION_INVULN_MS`.
pub fn enter_phase(
    brain: &mut BossBrain,
    health: &mut Health,
    defense: &mut Defense,
    to: BossPhase,
    now_ms: f64,
) -> bool {
    if brain.phase == to {
        return false;
    }
    let from = brain.phase;
    health.reset_to(entry_hp(from, to, health.max_hp));
    brain.phase = to;
    brain.last_used.clear();
    brain.casting = None;
    brain.leap = None;
    brain.defending_until_ms = None;
    brain.next_cast_at_ms = now_ms + PHASE_TRANSITION_INVULN_MS;
    brain.phase_changes += 1;
    defense.damage_taken_mult = 1.0;
    defense.invulnerable_until_ms = now_ms + PHASE_TRANSITION_INVULN_MS;
    log::info!(
        "boss {:?} phase {:?} -> {:?} ({} hp)",
        brain.archetype,
        from,
        to,
        health.hp
    );
    true
}

/// What a boss's phase check asks the caller to do once borrows end.
enum Followup {
    SpawnMinis(Vec2),
    KillMinions,
}

/// Post-damage boss bookkeeping: brood bond damage, split and merge, phase
/// change on depletion and defeat. Returns the bosses defeated this tick.
pub fn bookkeeping(world: &mut World, sim: &mut SimulationState) -> Vec<Entity> {
    let now = sim.clock.now_ms;
    let bosses: Vec<Entity> = world
        .query::<(&Behavior, &Combatant)>()
        .iter()
        .filter(|(_, (b, c))| **b == Behavior::BossAi && c.alive)
        .map(|(e, _)| e)
        .collect();

    let mut defeated = Vec::new();
    for boss in bosses {
        let minions_alive = minions::alive_count(world, boss);
        brood_bond(world, sim, boss, minions_alive);

        let mut followups = Vec::new();
        let Ok((brain, health, defense, combatant, kin)) = world
            .query_one_mut::<(&mut BossBrain, &mut Health, &mut Defense, &mut Combatant, &mut Kinematics)>(boss)
        else {
            continue;
        };

        if brain.phase == BossPhase::Split {
            let expired = brain
                .split_started_at_ms
                .is_some_and(|t| now - t >= SPLIT_FORM_MS);
            if minions_alive == 0 || expired {
                enter_phase(brain, health, defense, BossPhase::Normal, now);
                brain.split_started_at_ms = None;
                combatant.intangible = false;
                if minions_alive > 0 {
                    followups.push(Followup::KillMinions);
                }
                sim.fx.push(FxEvent::Explosion {
                    pos: kin.pos,
                    radius: 60.0,
                    duration_ms: 400.0,
                    color: Color::ORANGE,
                    wave: true,
                });
            }
        } else if should_split(brain.archetype, brain.phase, health.fraction(), brain.has_split) {
            enter_phase(brain, health, defense, BossPhase::Split, now);
            brain.has_split = true;
            brain.split_started_at_ms = Some(now);
            combatant.intangible = true;
            kin.vel = Vec2::ZERO;
            followups.push(Followup::SpawnMinis(kin.pos));
        } else if health.is_depleted() {
            match phase_on_depletion(brain.archetype, brain.phase) {
                Some(next) => {
                    enter_phase(brain, health, defense, next, now);
                    sim.fx.push(FxEvent::Explosion {
                        pos: kin.pos,
                        radius: 90.0,
                        duration_ms: 700.0,
                        color: Color::PURPLE,
                        wave: true,
                    });
                }
                None => {
                    combatant.alive = false;
                    combatant.died_at_ms = Some(now);
                    sim.fx.push(FxEvent::Explosion {
                        pos: kin.pos,
                        radius: 100.0,
                        duration_ms: 900.0,
                        color: get_profile(brain.archetype).color,
                        wave: true,
                    });
                    log::info!("boss {:?} defeated", brain.archetype);
                    followups.push(Followup::KillMinions);
                    defeated.push(boss);
                }
            }
        }

        for followup in followups {
            match followup {
                Followup::SpawnMinis(at) => {
                    let radius = world.get::<&Collider>(boss).map_or(BOSS_RADIUS, |c| c.radius);
                    spawn_ring(world, sim, boss, at, radius, SPLIT_MINIS, MinionSpec::SPLIT_MINI);
                }
                Followup::KillMinions => kill_minions(world, boss, now),
            }
        }
    }
    defeated
}

/// A wiped brood hurts the mother.
fn brood_bond(world: &mut World, sim: &mut SimulationState, boss: Entity, minions_alive: u32) {
    let pending = world
        .get::<&BossBrain>(boss)
        .is_ok_and(|b| b.brood_pending);
    if !pending || minions_alive > 0 {
        return;
    }
    if let Ok(mut brain) = world.get::<&mut BossBrain>(boss) {
        brain.brood_pending = false;
    }
    let max_hp = world.get::<&Health>(boss).map_or(0.0, |h| h.max_hp);
    let amount = max_hp * BROOD_BOND_DAMAGE;
    let outcome = damage::damage_entity(world, boss, amount, sim.clock.now_ms, false);
    if let (Some(outcome), Ok(kin)) = (outcome, world.get::<&Kinematics>(boss)) {
        sim.fx.push(FxEvent::DamageNumber {
            pos: kin.pos,
            amount: outcome.hp_lost(),
            kind: DamageKind::Normal,
        });
    }
    log::debug!("brood wiped, mother takes {:.0}", amount);
}

fn kill_minions(world: &mut World, parent: Entity, now_ms: f64) {
    for (_e, (behavior, combatant)) in world.query_mut::<(&Behavior, &mut Combatant)>() {
        if *behavior == (Behavior::Minion { parent }) && combatant.alive {
            combatant.alive = false;
            combatant.died_at_ms = Some(now_ms);
        }
    }
}
