//! Point/segment primitives.

use glam::Vec2;

const PARALLEL_EPSILON: f32 = 1e-9;

#[inline]
fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Squared distance from `p` to segment `a`-`b`. Use in hot loops and
/// compare against a squared radius.
pub fn point_segment_distance_sq(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance_squared(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance_squared(a + ab * t)
}

/// Distance from `p` to segment `a`-`b`.
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    point_segment_distance_sq(p, a, b).sqrt()
}

/// Parametric position along `p1`-`p2` where it crosses `p3`-`p4`.
///
/// Returns `None` when the segments are parallel or the crossing lies
/// outside `[0,1]` on either segment.
pub fn segment_segment_intersection_param(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> Option<f32> {
    let r = p2 - p1;
    let s = p4 - p3;
    let denom = cross(r, s);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }
    let qp = p3 - p1;
    let t = cross(qp, s) / denom;
    let u = cross(qp, r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(t)
    } else {
        None
    }
}

/// True when segments `p1`-`p2` and `p3`-`p4` cross.
pub fn segment_segment_intersects(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> bool {
    segment_segment_intersection_param(p1, p2, p3, p4).is_some()
}

/// Earliest `t ∈ [0,1]` at which a point moving from `p1` to `p2` comes
/// within `radius` of `center`. A start point already inside returns `0`.
pub fn segment_circle_hit(p1: Vec2, p2: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let d = p2 - p1;
    let f = p1 - center;
    let c = f.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    let a = d.length_squared();
    if a <= f32::EPSILON {
        return None;
    }
    let b = 2.0 * f.dot(d);
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let t = (-b - disc.sqrt()) / (2.0 * a);
    (0.0..=1.0).contains(&t).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_segment_distance_projects_inside() {
        let d = point_segment_distance(Vec2::new(5.0, 3.0), Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert!((d - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_segment_distance_clamps_to_endpoint() {
        let d = point_segment_distance(Vec2::new(13.0, 4.0), Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_segment_is_point_distance() {
        let a = Vec2::new(2.0, 2.0);
        assert!((point_segment_distance_sq(Vec2::new(5.0, 6.0), a, a) - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_intersection_param() {
        let t = segment_segment_intersection_param(
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            Vec2::new(4.0, -5.0),
            Vec2::new(4.0, 5.0),
        );
        assert!((t.unwrap_or(-1.0) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_parallel_segments_never_intersect() {
        assert!(!segment_segment_intersects(
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(10.0, 1.0),
        ));
    }

    #[test]
    fn test_crossing_outside_second_segment_is_rejected() {
        assert!(segment_segment_intersection_param(
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            Vec2::new(4.0, 1.0),
            Vec2::new(4.0, 5.0),
        )
        .is_none());
    }

    #[test]
    fn test_segment_circle_hit_earliest_contact() {
        let t = segment_circle_hit(Vec2::ZERO, Vec2::new(20.0, 0.0), Vec2::new(15.0, 0.0), 5.0);
        assert!((t.unwrap_or(-1.0) - 0.5).abs() < 1e-5);
        assert!(segment_circle_hit(Vec2::ZERO, Vec2::new(20.0, 0.0), Vec2::new(10.0, 8.0), 5.0)
            .is_none());
    }
}
