//! Core types and definitions for the TANKDUEL combat simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands, configuration, state snapshots, events, and
//! constants. It has no dependency on the ECS or any rendering layer.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod events;
pub mod state;
pub mod types;

pub use tankduel_geometry as geometry;
