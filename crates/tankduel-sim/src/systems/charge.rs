//! Charge-shot state machine: `Idle -> Charging -> Armed`, firing on
//! release.

use hecs::World;

use tankduel_core::commands::FrameInput;
use tankduel_core::components::{Combatant, Mobility, WeaponTraits};
use tankduel_core::enums::ChargeState;
use tankduel_core::events::FxEvent;

use crate::components::{entity_id, Behavior, Controls, FireRequest, ShotKind};
use crate::state::SimulationState;

/// What a charge step asks the firing system to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeOutcome {
    None,
    /// Threshold reached this tick.
    BecameArmed,
    FireNormal,
    FireCharged,
}

/// Advance the charge machine by one sample of the fire key.
///
/// Hold time is measured from the press to the tick the release is seen;
/// a release at or after `threshold_ms` fires a charged shot.
pub fn step_charge(state: ChargeState, fire_held: bool, now_ms: f64, threshold_ms: f64) -> (ChargeState, ChargeOutcome) {
    match (state, fire_held) {
        (ChargeState::Idle, false) => (ChargeState::Idle, ChargeOutcome::None),
        (ChargeState::Idle, true) => (
            ChargeState::Charging {
                started_at_ms: now_ms,
            },
            ChargeOutcome::None,
        ),
        (ChargeState::Charging { started_at_ms }, true) => {
            if now_ms - started_at_ms >= threshold_ms {
                (ChargeState::Armed { started_at_ms }, ChargeOutcome::BecameArmed)
            } else {
                (state, ChargeOutcome::None)
            }
        }
        (ChargeState::Charging { started_at_ms }, false) => {
            let outcome = if now_ms - started_at_ms >= threshold_ms {
                ChargeOutcome::FireCharged
            } else {
                ChargeOutcome::FireNormal
            };
            (ChargeState::Idle, outcome)
        }
        (ChargeState::Armed { .. }, true) => (state, ChargeOutcome::None),
        (ChargeState::Armed { .. }, false) => (ChargeState::Idle, ChargeOutcome::FireCharged),
    }
}

pub fn run(world: &mut World, sim: &mut SimulationState, input: &FrameInput) {
    let now = sim.clock.now_ms;
    let threshold = sim.config.charge.threshold_ms;

    for (entity, (controls, behavior, combatant, traits, mobility)) in
        world.query_mut::<(&mut Controls, &Behavior, &Combatant, &WeaponTraits, &Mobility)>()
    {
        let Behavior::PlayerControlled { slot } = *behavior else {
            continue;
        };
        if !combatant.alive {
            controls.charge = ChargeState::Idle;
            continue;
        }

        let (next, outcome) = step_charge(controls.charge, input.for_slot(slot).fire, now, threshold);
        controls.charge = next;

        // Silence and stun eat the shot; the machine still returns to idle.
        let suppressed = traits.silenced || mobility.stunned;
        let kind = match outcome {
            ChargeOutcome::None => None,
            ChargeOutcome::BecameArmed => {
                sim.fx.push(FxEvent::ChargeReady {
                    target: entity_id(entity),
                });
                None
            }
            ChargeOutcome::FireNormal => Some(ShotKind::Normal),
            ChargeOutcome::FireCharged => Some(ShotKind::Charged),
        };
        if let Some(kind) = kind.filter(|_| !suppressed) {
            sim.fire_requests.push(FireRequest {
                shooter: entity,
                kind,
            });
        }
    }
}
