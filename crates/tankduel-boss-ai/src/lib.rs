//! Boss AI for TANKDUEL.
//!
//! Archetype profiles, per-phase skill tables, the movement-to-range
//! controller and leap easing curves. Pure functions on plain data; the
//! simulation crate executes whatever these decide.

pub mod easing;
pub mod fsm;
pub mod phases;
pub mod profiles;
pub mod skills;

pub use tankduel_core as core;
