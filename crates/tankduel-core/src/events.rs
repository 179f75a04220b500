//! Fire-and-forget requests to the visual and status-text collaborators.
//!
//! The simulation never reads these back; they are drained into the
//! snapshot at the end of each tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::DamageKind;
use crate::types::{Color, EntityId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FxEvent {
    Explosion {
        pos: Vec2,
        radius: f32,
        duration_ms: f64,
        color: Color,
        /// Expanding ring rather than a filled burst.
        wave: bool,
    },
    HitFlash {
        target: EntityId,
        pos: Vec2,
        color: Color,
    },
    /// Warning ring ahead of delayed area damage.
    Telegraph {
        pos: Vec2,
        radius: f32,
        duration_ms: f64,
        color: Color,
    },
    DamageNumber {
        pos: Vec2,
        amount: f32,
        kind: DamageKind,
    },
    StatusText {
        target: EntityId,
        text: String,
        color: Color,
        duration_ms: f64,
    },
    /// Charge threshold reached; emitted once per charge.
    ChargeReady { target: EntityId },
    MuzzleFlash { pos: Vec2, heading: f32 },
}
