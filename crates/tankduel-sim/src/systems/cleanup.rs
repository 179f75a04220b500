//! End-of-tick compaction: despawns dead bullets and faded minions, drops
//! collected pickups and expired hazards.

use hecs::{Entity, World};

use tankduel_core::components::Combatant;
use tankduel_core::constants::DEATH_FADE_MS;

use crate::components::{Behavior, Projectile};
use crate::state::SimulationState;

/// Uses a caller-owned buffer to avoid per-tick allocation. Player tanks are
/// never despawned; they are revived on round reset.
pub fn run(world: &mut World, sim: &mut SimulationState, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();
    let now = sim.clock.now_ms;

    for (entity, p) in world.query_mut::<&Projectile>() {
        if !p.alive {
            despawn_buffer.push(entity);
        }
    }

    for (entity, (combatant, behavior)) in world.query_mut::<(&Combatant, &Behavior)>() {
        if !matches!(behavior, Behavior::Minion { .. }) || combatant.alive {
            continue;
        }
        let faded = combatant
            .died_at_ms
            .map_or(true, |t| now - t >= DEATH_FADE_MS);
        if faded {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }

    sim.pickups.retain(|p| p.active);
    sim.hazards.retain(|h| !h.expired(now));
}
