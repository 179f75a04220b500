//! Resolves due scheduled events. Each event's guard is re-checked against
//! the current world; stale events are dropped without effect.

use glam::Vec2;
use hecs::World;

use tankduel_core::components::{Collider, Combatant, Kinematics, Weapon};
use tankduel_core::constants::*;
use tankduel_core::enums::{DamageKind, Team};
use tankduel_core::events::FxEvent;
use tankduel_core::types::Color;

use crate::components::BossBrain;
use crate::scheduler::{EventGuard, ScheduledAction, ScheduledEvent};
use crate::state::SimulationState;
use crate::systems::{damage, firing, targeting};

pub fn run(world: &mut World, sim: &mut SimulationState) {
    let now = sim.clock.now_ms;
    while let Some(event) = sim.scheduler.pop_due(now) {
        if !guard_holds(world, sim, &event) {
            log::debug!("dropping stale {:?}", event.action);
            continue;
        }
        resolve(world, sim, &event);
    }
}

/// Whether an event is still meaningful: same round, owner alive, and (if
/// required) owner still in the phase it was cast from.
pub fn guard_holds(world: &World, sim: &SimulationState, event: &ScheduledEvent) -> bool {
    if event.round != sim.round {
        return false;
    }
    let alive = world
        .get::<&Combatant>(event.owner)
        .map_or(false, |c| c.alive && !c.intangible);
    if !alive {
        return false;
    }
    match event.guard {
        EventGuard::OwnerAlive => true,
        EventGuard::OwnerInPhase(phase) => world
            .get::<&BossBrain>(event.owner)
            .map_or(false, |b| b.phase == phase),
    }
}

fn resolve(world: &mut World, sim: &mut SimulationState, event: &ScheduledEvent) {
    match event.action {
        ScheduledAction::TelegraphStrike {
            pos,
            radius,
            damage: amount,
        } => {
            sim.fx.push(FxEvent::Explosion {
                pos,
                radius,
                duration_ms: 350.0,
                color: Color::RED,
                wave: true,
            });
            let hits = damage::area_damage(
                world,
                sim,
                pos,
                radius,
                amount,
                Team::Boss,
                Some(event.owner),
                DamageKind::Explosion,
            );
            log::debug!("telegraph strike at {:?} hit {}", pos, hits);
        }
        ScheduledAction::DelayedVolley {
            shots_left,
            interval_ms,
        } => {
            fire_volley_shot(world, sim, event);
            if shots_left > 1 {
                sim.scheduler.schedule(
                    sim.clock.now_ms + interval_ms,
                    event.owner,
                    event.round,
                    event.guard,
                    ScheduledAction::DelayedVolley {
                        shots_left: shots_left - 1,
                        interval_ms,
                    },
                );
            }
        }
    }
}

/// One aimed shot at the owner's nearest target, re-aimed at fire time.
fn fire_volley_shot(world: &mut World, sim: &mut SimulationState, event: &ScheduledEvent) {
    let Ok(kin) = world.get::<&Kinematics>(event.owner).map(|k| *k) else {
        return;
    };
    let radius = world
        .get::<&Collider>(event.owner)
        .map_or(BOSS_RADIUS, |c| c.radius);
    let damage = world
        .get::<&Weapon>(event.owner)
        .map_or(BOSS_BULLET_DAMAGE, |w| w.damage * w.damage_mult);
    let Some(target) = targeting::nearest_target(world, sim.mode(), Team::Boss, kin.pos, Some(event.owner)) else {
        return;
    };
    let to = target.pos - kin.pos;
    let heading = to.y.atan2(to.x);
    let muzzle = kin.pos + Vec2::from_angle(heading) * (radius + BOSS_BULLET_RADIUS);
    let bullet = firing::enemy_bullet(
        event.owner,
        muzzle,
        heading,
        VOLLEY_BULLET_SPEED,
        damage,
        BOSS_BULLET_RADIUS,
        sim.clock.now_ms,
    );
    world.spawn((bullet,));
    sim.fx.push(FxEvent::MuzzleFlash { pos: muzzle, heading });
}
