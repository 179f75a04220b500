//! Target acquisition shared by homing bullets, focus-mode aim, bosses,
//! minions and opponent-targeted pickups.

use glam::Vec2;
use hecs::{Entity, World};

use tankduel_core::components::{Collider, Combatant, Kinematics, Visibility};
use tankduel_core::enums::{GameMode, Team};

use crate::state::hostile;

/// Position and targetability of one combatant, copied out of the world so
/// callers can hold it across mutable queries.
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub entity: Entity,
    pub team: Team,
    pub pos: Vec2,
    pub radius: f32,
    pub alive: bool,
    /// Alive, tangible and visible.
    pub targetable: bool,
}

pub fn bodies(world: &World) -> Vec<Body> {
    world
        .query::<(&Combatant, &Kinematics, &Collider, Option<&Visibility>)>()
        .iter()
        .map(|(entity, (c, k, col, vis))| Body {
            entity,
            team: c.team,
            pos: k.pos,
            radius: col.radius,
            alive: c.alive,
            targetable: c.alive && !c.intangible && !vis.is_some_and(|v| v.invisible),
        })
        .collect()
}

/// Nearest body `attacker` may target from `from`. Ties go to the lower
/// entity id so the pick does not depend on storage order.
pub fn nearest_hostile(
    bodies: &[Body],
    mode: GameMode,
    attacker: Team,
    from: Vec2,
    exclude: Option<Entity>,
) -> Option<Body> {
    bodies
        .iter()
        .filter(|b| b.targetable && Some(b.entity) != exclude && hostile(mode, attacker, b.team))
        .min_by(|a, b| {
            a.pos
                .distance_squared(from)
                .total_cmp(&b.pos.distance_squared(from))
                .then(a.entity.to_bits().cmp(&b.entity.to_bits()))
        })
        .copied()
}

pub fn nearest_target(
    world: &World,
    mode: GameMode,
    attacker: Team,
    from: Vec2,
    exclude: Option<Entity>,
) -> Option<Body> {
    nearest_hostile(&bodies(world), mode, attacker, from, exclude)
}

/// Whether `entity` is still a valid target for `attacker`.
pub fn still_valid(bodies: &[Body], mode: GameMode, attacker: Team, entity: Entity) -> Option<Body> {
    bodies
        .iter()
        .find(|b| b.entity == entity)
        .filter(|b| b.targetable && hostile(mode, attacker, b.team))
        .copied()
}
