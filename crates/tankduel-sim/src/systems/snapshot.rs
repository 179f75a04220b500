//! Snapshot system: builds an `ArenaSnapshot` from the world. Read-only
//! apart from draining the fx queue.

use hecs::World;

use tankduel_core::components::*;
use tankduel_core::enums::*;
use tankduel_core::state::*;

use crate::components::{entity_id, Behavior, BossBrain, Controls, Projectile};
use crate::effects::StatusEffects;
use crate::state::SimulationState;

/// Match-level fields owned by the engine rather than the simulation state.
#[derive(Debug, Clone, Copy)]
pub struct MatchView {
    pub phase: GamePhase,
    pub scores: [u32; 2],
    pub winner: Option<PlayerSlot>,
    pub bosses_defeated: u32,
}

pub fn build_snapshot(world: &World, sim: &mut SimulationState, view: MatchView) -> ArenaSnapshot {
    ArenaSnapshot {
        clock: sim.clock,
        phase: view.phase,
        mode: sim.mode(),
        round: sim.round,
        scores: view.scores,
        winner: view.winner,
        bosses_defeated: view.bosses_defeated,
        tanks: build_tanks(world, sim.clock.now_ms),
        bullets: build_bullets(world),
        pickups: sim
            .pickups
            .iter()
            .filter(|p| p.active)
            .map(|p| PickupView {
                kind: p.kind,
                pos: p.pos,
                radius: p.radius,
            })
            .collect(),
        hazards: sim
            .hazards
            .iter()
            .map(|h| HazardView {
                pos: h.pos,
                radius: h.radius,
                expires_at_ms: h.expires_at_ms,
            })
            .collect(),
        obstacles: sim.obstacles.rects(),
        fx: std::mem::take(&mut sim.fx),
    }
}

fn build_tanks(world: &World, now_ms: f64) -> Vec<TankView> {
    let mut tanks: Vec<TankView> = world
        .query::<(
            &Combatant,
            &Kinematics,
            &Collider,
            &Health,
            &Behavior,
            Option<&Ammo>,
            Option<&Controls>,
            Option<&Visibility>,
            Option<&Defense>,
            Option<&StatusEffects>,
            Option<&BossBrain>,
        )>()
        .iter()
        .map(
            |(entity, (c, k, col, health, behavior, ammo, controls, vis, defense, effects, brain))| {
                let is_player = matches!(behavior, Behavior::PlayerControlled { .. });
                TankView {
                    id: entity_id(entity),
                    team: c.team,
                    alive: c.alive,
                    pos: k.pos,
                    heading: k.heading,
                    radius: col.radius,
                    display_radius: col.display_radius,
                    hp: health.hp,
                    max_hp: health.max_hp,
                    ammo: ammo.filter(|_| is_player).map_or(0, |a| a.current),
                    max_ammo: ammo.filter(|_| is_player).map_or(0, |a| a.max),
                    charge: controls.map_or(ChargeState::Idle, |c| c.charge),
                    invisible: vis.is_some_and(|v| v.invisible),
                    shielded: defense.is_some_and(|d| d.shielded),
                    effects: effects
                        .map(|fx| fx.iter().map(|s| s.kind.label().to_string()).collect())
                        .unwrap_or_default(),
                    boss: brain.map(|b| BossView {
                        archetype: b.archetype,
                        phase: b.phase,
                        casting: b.casting.map(|(skill, _)| skill),
                        defending: b.defending_until_ms.is_some_and(|t| now_ms < t),
                        leaping: b.leap.is_some(),
                    }),
                }
            },
        )
        .collect();
    tanks.sort_by_key(|t| t.id);
    tanks
}

fn build_bullets(world: &World) -> Vec<BulletView> {
    let mut bullets: Vec<BulletView> = world
        .query::<&Projectile>()
        .iter()
        .filter(|(_, p)| p.alive)
        .map(|(entity, p)| BulletView {
            id: entity_id(entity),
            owner: entity_id(p.owner),
            pos: p.pos,
            vel: p.vel,
            radius: p.radius,
            damage: p.damage,
            critical: p.critical,
            charged: p.charged,
            trail: p.trail,
            element: p.element,
        })
        .collect();
    bullets.sort_by_key(|b| b.id);
    bullets
}
