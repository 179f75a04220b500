//! Fundamental simulation types.

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_FRAME_DT_MS, REFERENCE_FRAME_MS};

/// Stable identifier for an entity as seen from outside the ECS
/// (snapshots, fx events). Mirrors the bits of the underlying handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Simulation time tracking.
///
/// Time is driven by the real elapsed frame time handed in by the host,
/// so cooldowns and effect expiries stay consistent under frame-rate jitter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    /// Number of ticks executed.
    pub tick: u64,
    /// Elapsed simulation time in milliseconds.
    pub now_ms: f64,
    /// Duration of the last tick in milliseconds.
    pub dt_ms: f64,
}

impl SimClock {
    /// Advance by one tick of `dt_ms` (clamped to `[0, MAX_FRAME_DT_MS]`).
    pub fn advance(&mut self, dt_ms: f64) {
        let dt = if dt_ms.is_finite() {
            dt_ms.clamp(0.0, MAX_FRAME_DT_MS)
        } else {
            0.0
        };
        self.tick += 1;
        self.dt_ms = dt;
        self.now_ms += dt;
    }

    /// Last tick length in 60 Hz reference frames. Per-frame tuning
    /// constants are multiplied by this.
    pub fn frames(&self) -> f32 {
        (self.dt_ms / REFERENCE_FRAME_MS) as f32
    }

    /// Last tick length in seconds.
    pub fn dt_secs(&self) -> f32 {
        (self.dt_ms / 1000.0) as f32
    }
}

/// RGB colour handed to the visual collaborator (0xRRGGBB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xffffff);
    pub const RED: Color = Color(0xe53935);
    pub const ORANGE: Color = Color(0xff9800);
    pub const YELLOW: Color = Color(0xfdd835);
    pub const GREEN: Color = Color(0x43a047);
    pub const CYAN: Color = Color(0x00bcd4);
    pub const BLUE: Color = Color(0x1e88e5);
    pub const PURPLE: Color = Color(0x8e24aa);
    pub const TOXIC: Color = Color(0x7cb342);
    pub const GREY: Color = Color(0x9e9e9e);
}
