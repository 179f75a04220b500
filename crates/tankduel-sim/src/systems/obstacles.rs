//! Moves oscillating walls and pushes any body they swept into back out.

use hecs::World;

use tankduel_core::components::{Collider, Combatant, Kinematics};

use crate::state::SimulationState;

const PUSH_MARGIN: f32 = 0.5;

pub fn run(world: &mut World, sim: &mut SimulationState) {
    if !sim.obstacles.obstacles.iter().any(|o| o.is_moving()) {
        return;
    }
    let frames = sim.clock.frames();
    sim.obstacles.advance(&sim.bounds, frames);

    for (_e, (combatant, kin, collider)) in world.query_mut::<(&Combatant, &mut Kinematics, &Collider)>() {
        if !combatant.alive || combatant.intangible {
            continue;
        }
        let mut pos = kin.pos;
        for o in sim.obstacles.obstacles.iter().filter(|o| o.is_moving()) {
            pos = tankduel_geometry::push_out_of_rect(pos, collider.radius, &o.rect, PUSH_MARGIN);
        }
        kin.pos = sim.clamp_to_arena(pos, collider.radius);
    }
}
