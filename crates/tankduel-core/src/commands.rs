//! Host input: per-frame key state and queued match commands.
//!
//! Commands are queued and processed at the next tick boundary. Key state
//! is sampled once per tick and never written by the simulation.

use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Match-level actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    /// Leave the lobby (or restart after a finished match).
    StartMatch,
    Pause,
    Resume,
    SetControlScheme {
        slot: PlayerSlot,
        scheme: ControlScheme,
    },
    /// Add a permanent boss-mode reward to a player's retained list.
    GrantBossBuff { slot: PlayerSlot, buff: BossBuff },
}

/// Pressed state of one player's binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TankInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

impl TankInput {
    pub const IDLE: TankInput = TankInput {
        forward: false,
        back: false,
        left: false,
        right: false,
        fire: false,
    };
}

/// Key state for both seats, sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInput {
    pub players: [TankInput; 2],
}

impl FrameInput {
    pub fn for_slot(&self, slot: PlayerSlot) -> TankInput {
        self.players[slot.index()]
    }
}
