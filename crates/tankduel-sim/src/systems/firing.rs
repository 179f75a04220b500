//! Firing: turns fire requests into bullets. Every fire-time damage modifier
//! (critical, fury, charge, pierce/bounce stack factors) is baked into the
//! projectile here; elemental statuses are rolled here and applied at
//! impact.

use std::f32::consts::PI;

use glam::Vec2;
use hecs::{Entity, World};
use rand::Rng;

use tankduel_core::components::*;
use tankduel_core::constants::*;
use tankduel_core::enums::{Element, SplitTrigger, Team};
use tankduel_core::events::FxEvent;

use crate::components::{FireRequest, Projectile, ShotKind, SplitCharge};
use crate::state::SimulationState;

pub fn run(world: &mut World, sim: &mut SimulationState) {
    let requests = std::mem::take(&mut sim.fire_requests);
    for req in requests {
        fire(world, sim, req);
    }
}

/// Everything about the shooter the bullet factory reads.
#[derive(Clone, Copy)]
struct Shooter {
    team: Team,
    pos: Vec2,
    heading: f32,
    radius: f32,
    traits: WeaponTraits,
    weapon: Weapon,
    buffs: BossBuffStats,
}

fn read_shooter(world: &World, entity: Entity) -> Option<Shooter> {
    let mut q = world
        .query_one::<(&Combatant, &Kinematics, &Collider, &WeaponTraits, &Weapon, &BossBuffStats, &Mobility)>(entity)
        .ok()?;
    let (c, k, col, traits, weapon, buffs, mobility) = q.get()?;
    if !c.alive || traits.silenced || mobility.stunned {
        return None;
    }
    Some(Shooter {
        team: c.team,
        pos: k.pos,
        heading: k.heading,
        radius: col.radius,
        traits: *traits,
        weapon: *weapon,
        buffs: *buffs,
    })
}

/// Copy the owner's weapon traits and boss-buff budgets onto a bullet.
/// `scale_damage` bakes the pierce-stack damage factor in as well.
pub fn apply_owner_traits(p: &mut Projectile, traits: &WeaponTraits, buffs: &BossBuffStats, scale_damage: bool) {
    p.homing = traits.homing;
    p.explosive = traits.explosive;
    p.poison = traits.poison;
    p.trail = traits.trail;
    p.max_bounces = if traits.ricochet { RICOCHET_BOUNCES } else { 0 } + buffs.bounce;
    if buffs.bounce > 0 {
        p.bounce_damage_factor = Some(BOUNCE_DAMAGE_FACTOR);
        p.bounce_budget = buffs.bounce;
    }
    p.pierce_left = if traits.pierce { PIERCE_TARGETS } else { 1 } + buffs.pierce;
    p.wall_pierce = 1 + buffs.pierce;
    if scale_damage && buffs.pierce > 0 {
        let factor = PIERCE_STACK_DAMAGE_FACTOR
            .powi(buffs.pierce as i32)
            .max(PIERCE_DAMAGE_FLOOR);
        p.damage *= factor;
    }
    p.split = match buffs.shot_split {
        0 => SplitCharge::Disarmed,
        1 => SplitCharge::Armed(SplitTrigger::OnImpact),
        _ => SplitCharge::Armed(SplitTrigger::OnEnemyHit),
    };
}

fn roll_element<R: Rng + ?Sized>(rng: &mut R) -> Element {
    if rng.gen_bool(0.5) {
        Element::Fire
    } else {
        Element::Ice
    }
}

/// Fire one request. Returns the number of bullets spawned; zero when the
/// shooter is gone, silenced, stunned or out of ammo.
pub fn fire(world: &mut World, sim: &mut SimulationState, req: FireRequest) -> usize {
    let Some(shooter) = read_shooter(world, req.shooter) else {
        return 0;
    };

    let mut charged = req.kind == ShotKind::Charged;
    let paid = match world.get::<&mut Ammo>(req.shooter) {
        Ok(mut ammo) => match req.kind {
            ShotKind::Bonus => true,
            ShotKind::Charged => {
                if ammo.try_spend(sim.config.charge.ammo_cost) {
                    true
                } else {
                    charged = false;
                    ammo.try_spend(1)
                }
            }
            ShotKind::Normal => ammo.try_spend(1),
        },
        Err(_) => false,
    };
    if !paid {
        return 0;
    }

    let now = sim.clock.now_ms;
    let mut damage = shooter.weapon.damage * shooter.weapon.damage_mult;
    let mut radius = shooter.weapon.bullet_radius;
    let mut speed = shooter.weapon.bullet_speed;
    if shooter.traits.big_bullet {
        radius = BIG_BULLET_RADIUS;
        damage *= BIG_BULLET_DAMAGE_MULT;
    }
    if shooter.traits.fury {
        damage *= FURY_MULT;
    }
    if charged {
        damage *= sim.config.charge.damage_mult;
        radius *= CHARGE_RADIUS_MULT;
        speed *= CHARGE_SPEED_MULT;
    }
    let critical = shooter.buffs.critical > 0
        && sim
            .rng
            .gen_bool((CRIT_CHANCE * shooter.buffs.critical as f64).min(1.0));
    if critical {
        damage *= CRIT_MULT;
    }

    let headings = if shooter.traits.shotgun {
        damage *= SHOTGUN_DAMAGE_MULT;
        fan(shooter.heading, SHOTGUN_SPREAD, SHOTGUN_PELLETS)
    } else {
        vec![shooter.heading]
    };

    let forward = Vec2::from_angle(shooter.heading);
    let mut barrels = vec![shooter.pos];
    if shooter.traits.clone {
        barrels.push(shooter.pos + forward.perp() * CLONE_OFFSET);
    }

    let muzzle = shooter.radius + (MUZZLE_OFFSET - TANK_RADIUS);
    let mut spawned = 0;
    for &barrel in &barrels {
        for &heading in &headings {
            let dir = Vec2::from_angle(heading);
            let mut p = Projectile::plain(
                req.shooter,
                shooter.team,
                barrel + dir * muzzle,
                dir * speed,
                radius,
                damage,
                now,
            );
            apply_owner_traits(&mut p, &shooter.traits, &shooter.buffs, true);
            p.base_damage = p.damage;
            p.critical = critical;
            p.charged = charged;
            if shooter.traits.elemental {
                p.element = Some(roll_element(&mut sim.rng));
            }
            world.spawn((p,));
            spawned += 1;
        }
        sim.fx.push(FxEvent::MuzzleFlash {
            pos: barrel + forward * muzzle,
            heading: shooter.heading,
        });
    }
    spawned
}

/// Two children at the impact point, each deflected up to `SPLIT_SPREAD`
/// from the parent's pre-impact heading and dealing exactly
/// `SPLIT_DAMAGE_FRACTION` of the parent's base damage. Children pick the
/// owner's current traits back up but can never split again.
pub fn split_children(
    world: &World,
    sim: &mut SimulationState,
    parent: &Projectile,
    pos: Vec2,
    heading: f32,
) -> Vec<Projectile> {
    let owner_traits = world
        .query_one::<(&WeaponTraits, &BossBuffStats)>(parent.owner)
        .ok()
        .and_then(|mut q| q.get().map(|(t, b)| (*t, *b)));
    let speed = parent.vel.length().max(1.0);
    let damage = parent.base_damage * SPLIT_DAMAGE_FRACTION;
    let now = sim.clock.now_ms;

    (0..2)
        .map(|_| {
            let spread = sim.rng.gen_range(-SPLIT_SPREAD..=SPLIT_SPREAD);
            let dir = Vec2::from_angle(heading + spread);
            let mut child = Projectile::plain(
                parent.owner,
                parent.owner_team,
                pos,
                dir * speed,
                parent.radius,
                damage,
                now,
            );
            if let Some((traits, buffs)) = &owner_traits {
                apply_owner_traits(&mut child, traits, buffs, false);
                if traits.elemental {
                    child.element = Some(roll_element(&mut sim.rng));
                }
            }
            child.damage = damage;
            child.base_damage = damage;
            child.pierced = parent.pierced.clone();
            child.split = SplitCharge::Consumed;
            child
        })
        .collect()
}

/// Bullet fired by a boss or minion from `muzzle`.
pub fn enemy_bullet(owner: Entity, muzzle: Vec2, heading: f32, speed: f32, damage: f32, radius: f32, now_ms: f64) -> Projectile {
    let dir = Vec2::from_angle(heading);
    Projectile::plain(owner, Team::Boss, muzzle, dir * speed, radius, damage, now_ms)
}

/// Evenly spaced headings across `spread` centred on `center`.
pub fn fan(center: f32, spread: f32, count: u32) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![center],
        n => (0..n)
            .map(|i| center - spread * 0.5 + spread * i as f32 / (n - 1) as f32)
            .collect(),
    }
}

/// Headings around a full circle.
pub fn ring(count: u32, offset: f32) -> Vec<f32> {
    (0..count)
        .map(|i| offset + 2.0 * PI * i as f32 / count.max(1) as f32)
        .collect()
}
