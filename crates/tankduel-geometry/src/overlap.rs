//! Static overlap tests for slow-moving bodies.

use glam::Vec2;

use crate::rect::Rect;

/// Circle-vs-rectangle overlap: AABB early reject, then clamp-to-nearest
/// point distance check.
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    if center.x + radius < rect.left()
        || center.x - radius > rect.right()
        || center.y + radius < rect.top()
        || center.y - radius > rect.bottom()
    {
        return false;
    }
    rect.clamp_point(center).distance_squared(center) < radius * radius
}

/// Circle-vs-circle overlap with early-exit axis checks.
pub fn circle_circle_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    let dx = (a.x - b.x).abs();
    if dx >= reach {
        return false;
    }
    let dy = (a.y - b.y).abs();
    if dy >= reach {
        return false;
    }
    dx * dx + dy * dy < reach * reach
}

/// Move a circle out of `rect` along the axis of least penetration, leaving
/// `margin` clearance. Circles that do not overlap are returned unchanged.
pub fn push_out_of_rect(center: Vec2, radius: f32, rect: &Rect, margin: f32) -> Vec2 {
    if !circle_rect_overlap(center, radius, rect) {
        return center;
    }
    let reach = radius + margin;
    let to_left = (center.x - (rect.left() - reach)).abs();
    let to_right = ((rect.right() + reach) - center.x).abs();
    let to_top = (center.y - (rect.top() - reach)).abs();
    let to_bottom = ((rect.bottom() + reach) - center.y).abs();

    if to_left <= to_right && to_left <= to_top && to_left <= to_bottom {
        Vec2::new(rect.left() - reach, center.y)
    } else if to_right <= to_top && to_right <= to_bottom {
        Vec2::new(rect.right() + reach, center.y)
    } else if to_top <= to_bottom {
        Vec2::new(center.x, rect.top() - reach)
    } else {
        Vec2::new(center.x, rect.bottom() + reach)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_circle_rect_corner_miss() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        // Inside the AABB reject box but outside the rounded corner.
        assert!(!circle_rect_overlap(Vec2::new(-3.0, -3.0), 4.0, &rect));
        assert!(circle_rect_overlap(Vec2::new(-2.0, 5.0), 4.0, &rect));
    }

    #[test]
    fn test_circle_circle_overlap() {
        assert!(circle_circle_overlap(Vec2::ZERO, 5.0, Vec2::new(9.0, 0.0), 5.0));
        assert!(!circle_circle_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
        assert!(!circle_circle_overlap(Vec2::ZERO, 5.0, Vec2::new(7.5, 7.5), 5.0));
    }

    #[test]
    fn test_push_out_uses_shallowest_side() {
        let rect = Rect::new(0.0, 0.0, 100.0, 20.0);
        let p = push_out_of_rect(Vec2::new(50.0, 2.0), 5.0, &rect, 1.0);
        assert_eq!(p, Vec2::new(50.0, -6.0));
        assert!(!circle_rect_overlap(p, 5.0, &rect));
    }

    proptest! {
        #[test]
        fn prop_push_out_clears_rect(x in -20.0f32..120.0, y in -20.0f32..40.0, r in 1.0f32..15.0) {
            let rect = Rect::new(0.0, 0.0, 100.0, 20.0);
            let p = push_out_of_rect(Vec2::new(x, y), r, &rect, 0.5);
            prop_assert!(!circle_rect_overlap(p, r, &rect));
        }
    }
}
