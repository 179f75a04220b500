//! Damage resolution: bullet-vs-combatant hits, the shield/absorb pipeline,
//! explosions and area damage.

use glam::Vec2;
use hecs::{Entity, World};
use rand::Rng;

use tankduel_core::components::*;
use tankduel_core::constants::*;
use tankduel_core::enums::{DamageKind, EffectKind, Element, SplitTrigger, Team};
use tankduel_core::events::FxEvent;
use tankduel_core::types::Color;
use tankduel_geometry::segment_circle_hit;

use crate::components::{entity_id, Behavior, FireRequest, Projectile, ShotKind, SplitCharge};
use crate::effects::{next_poison_stack, StatusEffects};
use crate::state::SimulationState;
use crate::systems::ballistics::Impact;
use crate::systems::{firing, status};

/// Result of pushing damage through a target's defenses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    /// Negated by invulnerability, a pickup shield or the guardian shield.
    Blocked,
    /// Fully soaked by the micro-shield.
    Absorbed(f32),
    Dealt { absorbed: f32, lost: f32 },
}

impl HitOutcome {
    pub fn hp_lost(&self) -> f32 {
        match self {
            HitOutcome::Dealt { lost, .. } => *lost,
            _ => 0.0,
        }
    }
}

/// Shield/absorb ordering: invulnerability and pickup shield negate; an
/// armed guardian shield negates once and disarms (only when
/// `consume_guardian`); the micro-shield soaks what it can; the defense
/// multiplier scales the rest before HP is touched.
pub fn resolve_hit(
    health: &mut Health,
    defense: &Defense,
    buffs: &mut BossBuffStats,
    amount: f32,
    now_ms: f64,
    consume_guardian: bool,
) -> HitOutcome {
    if !amount.is_finite() || amount <= 0.0 {
        return HitOutcome::Dealt {
            absorbed: 0.0,
            lost: 0.0,
        };
    }
    if now_ms < defense.invulnerable_until_ms || defense.shielded {
        return HitOutcome::Blocked;
    }
    if consume_guardian && buffs.shield_ready {
        buffs.shield_ready = false;
        return HitOutcome::Blocked;
    }
    let absorbed = buffs.micro_shield_hp.clamp(0.0, amount);
    buffs.micro_shield_hp -= absorbed;
    let remainder = (amount - absorbed) * defense.damage_taken_mult.max(0.0);
    if remainder <= 0.0 {
        return HitOutcome::Absorbed(absorbed);
    }
    let lost = health.damage(remainder);
    HitOutcome::Dealt { absorbed, lost }
}

/// Push `amount` through an entity's defenses. `None` if it has no health.
pub fn damage_entity(
    world: &mut World,
    entity: Entity,
    amount: f32,
    now_ms: f64,
    consume_guardian: bool,
) -> Option<HitOutcome> {
    let (health, defense, buffs) = world
        .query_one_mut::<(&mut Health, &Defense, &mut BossBuffStats)>(entity)
        .ok()?;
    Some(resolve_hit(health, defense, buffs, amount, now_ms, consume_guardian))
}

fn outcome_fx(sim: &mut SimulationState, pos: Vec2, outcome: HitOutcome, kind: DamageKind) {
    let (amount, kind) = match outcome {
        HitOutcome::Blocked => (0.0, DamageKind::Blocked),
        HitOutcome::Absorbed(a) => (a, DamageKind::Absorbed),
        HitOutcome::Dealt { lost, .. } => (lost, kind),
    };
    sim.fx.push(FxEvent::DamageNumber { pos, amount, kind });
}

/// A damageable body for area queries.
struct Body {
    entity: Entity,
    team: Team,
    pos: Vec2,
    radius: f32,
}

fn live_bodies(world: &World) -> Vec<Body> {
    world
        .query::<(&Combatant, &Kinematics, &Collider)>()
        .iter()
        .filter(|(_, (c, _, _))| c.alive && !c.intangible)
        .map(|(entity, (c, k, col))| Body {
            entity,
            team: c.team,
            pos: k.pos,
            radius: col.radius,
        })
        .collect()
}

/// Hostile bodies whose circle touches the disc at `center`.
fn caught_in(
    world: &World,
    sim: &SimulationState,
    center: Vec2,
    radius: f32,
    attacker: Team,
    exclude: Option<Entity>,
) -> Vec<Body> {
    live_bodies(world)
        .into_iter()
        .filter(|b| Some(b.entity) != exclude && sim.hostile(attacker, b.team))
        .filter(|b| b.pos.distance(center) <= radius + b.radius)
        .collect()
}

/// Damage every hostile body whose circle touches the disc at `center`.
/// Returns the number of bodies hit.
#[allow(clippy::too_many_arguments)]
pub fn area_damage(
    world: &mut World,
    sim: &mut SimulationState,
    center: Vec2,
    radius: f32,
    amount: f32,
    attacker: Team,
    exclude: Option<Entity>,
    kind: DamageKind,
) -> u32 {
    let now = sim.clock.now_ms;
    let mut hits = 0;
    for body in caught_in(world, sim, center, radius, attacker, exclude) {
        if let Some(outcome) = damage_entity(world, body.entity, amount, now, true) {
            outcome_fx(sim, body.pos, outcome, kind);
            hits += 1;
        }
    }
    hits
}

/// Explosion damage: a fixed HP decrement. Any shield, including a
/// micro-shield with charge left, blocks it entirely and stays as it was.
pub fn resolve_blast(
    health: &mut Health,
    defense: &Defense,
    buffs: &BossBuffStats,
    amount: f32,
    now_ms: f64,
) -> HitOutcome {
    if !amount.is_finite() || amount <= 0.0 {
        return HitOutcome::Dealt {
            absorbed: 0.0,
            lost: 0.0,
        };
    }
    let shielded = now_ms < defense.invulnerable_until_ms
        || defense.shielded
        || buffs.shield_ready
        || buffs.micro_shield_hp > 0.0;
    if shielded {
        return HitOutcome::Blocked;
    }
    HitOutcome::Dealt {
        absorbed: 0.0,
        lost: health.damage(amount),
    }
}

/// Explosive round detonation: flat damage to everything hostile in range.
/// Returns the number of bodies hit.
pub fn explode(world: &mut World, sim: &mut SimulationState, pos: Vec2, owner: Entity, owner_team: Team) -> u32 {
    sim.fx.push(FxEvent::Explosion {
        pos,
        radius: EXPLOSION_RADIUS,
        duration_ms: 400.0,
        color: Color::ORANGE,
        wave: false,
    });
    let now = sim.clock.now_ms;
    let mut hits = 0;
    for body in caught_in(world, sim, pos, EXPLOSION_RADIUS, owner_team, Some(owner)) {
        let Ok((health, defense, buffs)) =
            world.query_one_mut::<(&mut Health, &Defense, &BossBuffStats)>(body.entity)
        else {
            continue;
        };
        let outcome = resolve_blast(health, defense, buffs, EXPLOSION_DAMAGE, now);
        outcome_fx(sim, body.pos, outcome, DamageKind::Explosion);
        hits += 1;
    }
    hits
}

/// Earliest contact of a circle with a bullet's traced path this tick.
/// `t` runs from 0 at `prev_pos` to the number of traced sub-segments.
fn trace_hit(p: &Projectile, center: Vec2, radius: f32) -> Option<(f32, Vec2)> {
    let mut from = p.prev_pos;
    let path = if p.trace.is_empty() {
        std::slice::from_ref(&p.pos)
    } else {
        p.trace.as_slice()
    };
    for (i, &to) in path.iter().enumerate() {
        if let Some(t) = segment_circle_hit(from, to, center, radius) {
            return Some((i as f32 + t, from + (to - from) * t));
        }
        from = to;
    }
    None
}

struct Candidate {
    bullet: Entity,
    target: Entity,
    t: f32,
    at: Vec2,
}

/// Bullet-vs-combatant collision and damage.
pub fn run(world: &mut World, sim: &mut SimulationState) {
    let bodies: Vec<Body> = live_bodies(world)
        .into_iter()
        .filter(|b| {
            world
                .get::<&Visibility>(b.entity)
                .map_or(true, |v| !v.invisible)
        })
        .collect();

    let mut candidates: Vec<Candidate> = Vec::new();
    // Bullets stopped by a wall this tick may still hit targets on the
    // traced path; an exhausted pierce budget is what rules a bullet out.
    for (bullet, p) in world.query::<&Projectile>().iter() {
        if p.pierce_left == 0 {
            continue;
        }
        for body in &bodies {
            if body.entity == p.owner
                || !sim.hostile(p.owner_team, body.team)
                || p.pierced.contains(&body.entity)
            {
                continue;
            }
            if let Some((t, at)) = trace_hit(p, body.pos, body.radius + p.radius) {
                candidates.push(Candidate {
                    bullet,
                    target: body.entity,
                    t,
                    at,
                });
            }
        }
    }
    candidates.sort_by(|a, b| {
        a.bullet
            .to_bits()
            .cmp(&b.bullet.to_bits())
            .then(a.t.total_cmp(&b.t))
            .then(a.target.to_bits().cmp(&b.target.to_bits()))
    });

    let mut children: Vec<Projectile> = Vec::new();
    for c in candidates {
        resolve_candidate(world, sim, &c, &mut children);
    }
    resolve_wall_impacts(world, sim, &mut children);
    for child in children {
        world.spawn((child,));
    }
}

fn resolve_candidate(
    world: &mut World,
    sim: &mut SimulationState,
    c: &Candidate,
    children: &mut Vec<Projectile>,
) {
    let now = sim.clock.now_ms;
    let bullet = {
        let Ok(p) = world.get::<&Projectile>(c.bullet) else {
            return;
        };
        if p.pierce_left == 0 || p.pierced.contains(&c.target) {
            return;
        }
        Projectile::clone(&p)
    };
    let target_alive = world
        .get::<&Combatant>(c.target)
        .map_or(false, |t| t.alive && !t.intangible);
    if !target_alive {
        return;
    }

    // On-hit statuses land whether or not the hit is lethal or blocked.
    match bullet.element {
        Some(Element::Fire) => {
            status::apply_standard(world, c.target, EffectKind::Burn, now);
        }
        Some(Element::Ice) => {
            status::apply_standard(world, c.target, EffectKind::Chill, now);
        }
        None => {}
    }
    if bullet.poison {
        let current = world
            .get::<&StatusEffects>(c.target)
            .map_or(0, |fx| fx.stacks_of(EffectKind::Poisoned));
        let (duration, payload) = next_poison_stack(current);
        status::apply_effect(world, c.target, EffectKind::Poisoned, now, duration, payload);
    }

    let outcome = damage_entity(world, c.target, bullet.damage, now, true);
    let kind = if bullet.critical {
        DamageKind::Critical
    } else {
        DamageKind::Normal
    };
    if let Some(outcome) = outcome {
        sim.fx.push(FxEvent::HitFlash {
            target: entity_id(c.target),
            pos: c.at,
            color: Color::WHITE,
        });
        outcome_fx(sim, c.at, outcome, kind);
        after_hit(world, sim, &bullet, outcome);
    }

    if bullet.explosive {
        explode(world, sim, c.at, bullet.owner, bullet.owner_team);
    }

    let Ok(mut p) = world.get::<&mut Projectile>(c.bullet) else {
        return;
    };
    p.pierced.push(c.target);
    p.pierce_left = p.pierce_left.saturating_sub(1);
    let consumed = p.pierce_left == 0 || p.explosive;
    // Detonated on the target; a later wall contact must not detonate again.
    p.explosive = false;
    let split = match p.split {
        SplitCharge::Armed(SplitTrigger::OnEnemyHit) => true,
        SplitCharge::Armed(SplitTrigger::OnImpact) => consumed,
        _ => false,
    };
    if split || consumed {
        // Spent: later candidates on this tick's path are skipped.
        p.pierce_left = 0;
    }
    if split {
        let heading = p.heading();
        p.split = SplitCharge::Consumed;
        p.alive = false;
        p.pos = c.at;
        let parent = Projectile::clone(&p);
        drop(p);
        children.extend(firing::split_children(world, sim, &parent, c.at, heading));
    } else if consumed {
        p.alive = false;
        p.pos = c.at;
    }
}

/// Settle the wall contacts recorded by ballistics this tick. A bullet that
/// already detonated or split on a target earlier on its path skips its
/// wall outcome; split children carry the targets the parent went through.
fn resolve_wall_impacts(world: &mut World, sim: &mut SimulationState, children: &mut Vec<Projectile>) {
    let impacts = std::mem::take(&mut sim.wall_impacts);
    for (bullet, impact) in impacts {
        let parent = {
            let Ok(mut p) = world.get::<&mut Projectile>(bullet) else {
                continue;
            };
            match impact {
                Impact::Explode { .. } if p.explosive => p.explosive = false,
                Impact::Split { .. } if matches!(p.split, SplitCharge::Armed(_)) => {
                    p.split = SplitCharge::Consumed
                }
                _ => continue,
            }
            Projectile::clone(&p)
        };
        match impact {
            Impact::Explode { pos } => {
                explode(world, sim, pos, parent.owner, parent.owner_team);
            }
            Impact::Split { pos, heading } => {
                children.extend(firing::split_children(world, sim, &parent, pos, heading));
            }
        }
    }
}

/// Owner-side effects of a landed hit: life steal and twin-shot procs.
fn after_hit(world: &mut World, sim: &mut SimulationState, bullet: &Projectile, outcome: HitOutcome) {
    let owner_alive = world
        .get::<&Combatant>(bullet.owner)
        .map_or(false, |c| c.alive);
    if !owner_alive {
        return;
    }
    let (steal, twin) = match world.get::<&BossBuffStats>(bullet.owner) {
        Ok(b) => (b.life_steal_fraction(), b.twin_shot),
        Err(_) => return,
    };
    let lost = outcome.hp_lost();
    if steal > 0.0 && lost > 0.0 {
        if let Ok(mut health) = world.get::<&mut Health>(bullet.owner) {
            let healed = health.heal(lost * steal);
            if healed > 0.0 {
                if let Ok(k) = world.get::<&Kinematics>(bullet.owner) {
                    sim.fx.push(FxEvent::DamageNumber {
                        pos: k.pos,
                        amount: healed,
                        kind: DamageKind::Heal,
                    });
                }
            }
        }
    }
    if twin > 0 && bullet.split != SplitCharge::Consumed {
        let chance = (TWIN_SHOT_CHANCE * twin as f64).min(1.0);
        if sim.rng.gen_bool(chance) {
            sim.fire_requests.push(FireRequest {
                shooter: bullet.owner,
                kind: ShotKind::Bonus,
            });
        }
    }
}

/// Mark depleted non-boss combatants dead. Bosses go through their own
/// phase bookkeeping first.
pub fn settle_deaths(world: &mut World, sim: &mut SimulationState) {
    let now = sim.clock.now_ms;
    for (_e, (combatant, health, behavior, kin)) in
        world.query_mut::<(&mut Combatant, &Health, &Behavior, &Kinematics)>()
    {
        if !combatant.alive || !health.is_depleted() || *behavior == Behavior::BossAi {
            continue;
        }
        combatant.alive = false;
        combatant.died_at_ms = Some(now);
        sim.fx.push(FxEvent::Explosion {
            pos: kin.pos,
            radius: 40.0,
            duration_ms: 600.0,
            color: Color::ORANGE,
            wave: true,
        });
    }
}
