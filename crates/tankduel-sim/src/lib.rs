//! Combat simulation engine for TANKDUEL.
//!
//! Owns the hecs ECS world, runs every system in a fixed order each tick,
//! and produces `ArenaSnapshot`s. Headless and deterministic: the same seed,
//! inputs and frame times replay to identical snapshots.

pub mod components;
pub mod effects;
pub mod engine;
pub mod obstacles;
pub mod scheduler;
pub mod state;
pub mod systems;
pub mod world_setup;

pub use engine::CombatEngine;
pub use tankduel_core as core;

#[cfg(test)]
mod tests;
