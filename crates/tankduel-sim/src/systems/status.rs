//! Status ticking: effect updates and expiry, damage over time, reload and
//! display-radius easing.

use hecs::{Entity, World};

use tankduel_core::components::*;
use tankduel_core::constants::*;
use tankduel_core::enums::{DamageKind, EffectKind};
use tankduel_core::events::FxEvent;
use tankduel_core::types::Color;

use crate::components::{entity_id, Behavior};
use crate::effects::{standard_effect, EffectPayload, StatusEffects, TankHost};
use crate::state::SimulationState;
use crate::systems::damage::{resolve_hit, HitOutcome};

/// Run `f` with the entity's effect store and a host over its components.
pub fn with_effects<R>(
    world: &mut World,
    entity: Entity,
    f: impl FnOnce(&mut StatusEffects, &mut TankHost<'_>) -> R,
) -> Option<R> {
    let (effects, mobility, collider, traits, ammo, health, defense, visibility, buffs) = world
        .query_one_mut::<(
            &mut StatusEffects,
            &mut Mobility,
            &mut Collider,
            &mut WeaponTraits,
            &mut Ammo,
            &mut Health,
            &mut Defense,
            &mut Visibility,
            &mut BossBuffStats,
        )>(entity)
        .ok()?;
    let mut host = TankHost {
        mobility,
        collider,
        traits,
        ammo,
        health,
        defense,
        visibility,
        buffs,
        pending_dot: 0.0,
        healed: 0.0,
    };
    Some(f(effects, &mut host))
}

/// Apply an effect. Returns false if the entity cannot carry effects.
pub fn apply_effect(
    world: &mut World,
    entity: Entity,
    kind: EffectKind,
    now_ms: f64,
    duration_ms: Option<f64>,
    payload: EffectPayload,
) -> bool {
    let applied = with_effects(world, entity, |effects, host| {
        effects.apply(host, kind, now_ms, duration_ms, payload);
    })
    .is_some();
    if applied {
        log::debug!("effect {:?} applied to {:?}", kind, entity_id(entity));
    }
    applied
}

/// Apply an effect with its standard duration and payload.
pub fn apply_standard(world: &mut World, entity: Entity, kind: EffectKind, now_ms: f64) -> bool {
    let (duration, payload) = standard_effect(kind);
    apply_effect(world, entity, kind, now_ms, duration, payload)
}

/// Tear down every effect on an entity.
pub fn reset_effects(world: &mut World, entity: Entity) {
    with_effects(world, entity, |effects, host| effects.reset(host));
}

pub fn run(world: &mut World, sim: &mut SimulationState) {
    let now = sim.clock.now_ms;
    let dt_secs = sim.clock.dt_secs();
    let frames = sim.clock.frames();

    let entities: Vec<Entity> = world
        .query::<(&Combatant, &StatusEffects)>()
        .iter()
        .filter(|(_, (c, _))| c.alive)
        .map(|(e, _)| e)
        .collect();

    for entity in entities {
        let ticked = with_effects(world, entity, |effects, host| {
            effects.tick(host, now, dt_secs);
            let outcome = if host.pending_dot > 0.0 {
                Some(resolve_hit(
                    host.health,
                    host.defense,
                    host.buffs,
                    host.pending_dot,
                    now,
                    false,
                ))
            } else {
                None
            };
            (outcome, host.healed)
        });
        if let Some((Some(HitOutcome::Dealt { lost, .. }), _)) = ticked {
            if lost >= 1.0 {
                if let Ok(kin) = world.get::<&Kinematics>(entity) {
                    sim.fx.push(FxEvent::DamageNumber {
                        pos: kin.pos,
                        amount: lost,
                        kind: DamageKind::DamageOverTime,
                    });
                }
            }
        }
    }

    // Reload and display easing.
    for (_e, (combatant, ammo, buffs, behavior)) in
        world.query_mut::<(&Combatant, &mut Ammo, &BossBuffStats, &Behavior)>()
    {
        if combatant.alive && matches!(behavior, Behavior::PlayerControlled { .. }) {
            ammo.reload(dt_secs, buffs.reload_mult());
        }
    }
    let lerp = 1.0 - (1.0 - DISPLAY_RADIUS_LERP).powf(frames);
    for (_e, collider) in world.query_mut::<&mut Collider>() {
        collider.display_radius += (collider.radius - collider.display_radius) * lerp;
    }
}

/// Floating status label above an entity.
pub fn show_status(sim: &mut SimulationState, entity: Entity, text: &str, color: Color) {
    sim.fx.push(FxEvent::StatusText {
        target: entity_id(entity),
        text: text.to_string(),
        color,
        duration_ms: 1200.0,
    });
}
