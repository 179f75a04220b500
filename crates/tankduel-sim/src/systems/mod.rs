//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are free functions over `&mut World` plus the shared
//! `SimulationState`. Mutations that would conflict with an open query are
//! buffered and applied after it ends.

pub mod ballistics;
pub mod boss;
pub mod charge;
pub mod cleanup;
pub mod damage;
pub mod firing;
pub mod hazards;
pub mod minions;
pub mod obstacles;
pub mod pickups;
pub mod scheduled;
pub mod snapshot;
pub mod status;
pub mod tank_physics;
pub mod targeting;
