//! Persistent ground hazards (acid pools, blight fields).

use glam::Vec2;
use hecs::{Entity, World};

use tankduel_core::components::{Combatant, Kinematics};
use tankduel_core::constants::*;
use tankduel_core::enums::{EffectKind, Team};

use crate::effects::{EffectPayload, StatusEffects};
use crate::state::SimulationState;
use crate::systems::{damage, status};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardField {
    pub pos: Vec2,
    pub radius: f32,
    pub expires_at_ms: f64,
    /// Damage per second to anything hostile standing inside.
    pub dps: f32,
    /// Movement factor applied while inside.
    pub slow_factor: f32,
    /// Side that laid the hazard; it never hurts its own faction.
    pub faction: Team,
}

impl HazardField {
    pub fn expired(&self, now_ms: f64) -> bool {
        now_ms >= self.expires_at_ms
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.pos.distance_squared(p) <= self.radius * self.radius
    }
}

pub fn run(world: &mut World, sim: &mut SimulationState) {
    let now = sim.clock.now_ms;
    let dt_secs = sim.clock.dt_secs();
    if sim.hazards.is_empty() || dt_secs <= 0.0 {
        return;
    }

    let victims: Vec<(Entity, Vec2, Team)> = world
        .query::<(&Combatant, &Kinematics)>()
        .iter()
        .filter(|(_, (c, _))| c.alive && !c.intangible)
        .map(|(e, (c, k))| (e, k.pos, c.team))
        .collect();

    let hazards: Vec<HazardField> = sim.hazards.iter().copied().filter(|h| !h.expired(now)).collect();
    for hazard in hazards {
        for &(entity, pos, team) in &victims {
            if !hazard.contains(pos) || !sim.hostile(hazard.faction, team) {
                continue;
            }
            damage::damage_entity(world, entity, hazard.dps * dt_secs, now, false);
            refresh_slow(world, entity, hazard.slow_factor, now);
        }
    }
}

/// Keep a hazard slow alive while the body stays inside.
fn refresh_slow(world: &mut World, entity: Entity, factor: f32, now_ms: f64) {
    let until = now_ms + HAZARD_SLOW_REFRESH_MS;
    let extended = world
        .get::<&mut StatusEffects>(entity)
        .map_or(false, |mut fx| fx.extend(EffectKind::HazardSlow, until));
    if !extended {
        status::apply_effect(
            world,
            entity,
            EffectKind::HazardSlow,
            now_ms,
            Some(HAZARD_SLOW_REFRESH_MS),
            EffectPayload::Slow { factor },
        );
    }
}
