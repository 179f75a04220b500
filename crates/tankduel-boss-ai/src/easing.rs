//! Interpolation curves for leap abilities.

use glam::Vec2;
use std::f32::consts::PI;

use tankduel_core::enums::Easing;

/// Share of the charge-then-leap curve spent crouching.
const CROUCH_SHARE: f32 = 0.3;

/// How far the boss pulls back while crouching, as a share of the leap.
const CROUCH_DEPTH: f32 = 0.1;

/// Map progress `t` in `[0, 1]` through a curve. Output is 0 at `t = 0`
/// and 1 at `t = 1`; the charge curve dips below 0 in between.
pub fn ease(easing: Easing, t: f32) -> f32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 1.0 };
    match easing {
        Easing::EaseInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
            }
        }
        Easing::ChargeThenLeap => {
            if t < CROUCH_SHARE {
                -CROUCH_DEPTH * (PI * t / CROUCH_SHARE).sin()
            } else {
                let u = (t - CROUCH_SHARE) / (1.0 - CROUCH_SHARE);
                1.0 - (1.0 - u).powi(3)
            }
        }
    }
}

/// Position along a leap from `start` to `target` after `elapsed_ms` of a
/// `duration_ms` leap. Both ends are fixed at cast time.
pub fn leap_position(
    start: Vec2,
    target: Vec2,
    elapsed_ms: f64,
    duration_ms: f64,
    easing: Easing,
) -> Vec2 {
    let t = if duration_ms > 0.0 {
        (elapsed_ms / duration_ms) as f32
    } else {
        1.0
    };
    start + (target - start) * ease(easing, t)
}
