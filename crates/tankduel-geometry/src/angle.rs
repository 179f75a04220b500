//! Angle helpers.

use std::f32::consts::{PI, TAU};

/// Wrap an angle into [-π, π).
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped.is_finite() {
        wrapped
    } else {
        0.0
    }
}

/// Signed shortest rotation from `from` to `to`, in [-π, π).
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Rotate `current` toward `target` by at most `max_delta` radians.
pub fn rotate_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = angle_delta(current, target);
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_wraps_into_range() {
        assert!((normalize_angle(3.0 * PI) - (-PI)).abs() < 1e-5);
        assert!((normalize_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-5);
        assert_eq!(normalize_angle(f32::NAN), 0.0);
    }

    #[test]
    fn test_delta_takes_short_way_round() {
        let d = angle_delta(PI - 0.1, -PI + 0.1);
        assert!((d - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_rotate_towards_clamps() {
        let a = rotate_towards(0.0, 1.0, 0.25);
        assert!((a - 0.25).abs() < 1e-6);
        let b = rotate_towards(0.0, 0.1, 0.25);
        assert!((b - 0.1).abs() < 1e-6);
    }
}
