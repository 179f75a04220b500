//! Swept segment tests against rectangles and the arena boundary.

use glam::Vec2;

use crate::rect::{Rect, RectEdge};
use crate::segment::segment_segment_intersection_param;

/// Result of a swept test: where along the motion the contact happens and
/// which side was struck.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Fraction of the motion travelled at contact, in `[0,1]`.
    pub t: f32,
    /// Side of the (inflated) rectangle or arena that was struck.
    pub edge: RectEdge,
    /// Contact point (centre of the moving circle at contact).
    pub point: Vec2,
}

/// Sweep a circle of radius `inflate` from `p1` to `p2` against `rect`.
///
/// The rectangle is inflated by the radius and the centre path is tested
/// against all four inflated edges; the smallest valid `t` wins. The struck
/// side is the edge of the inflated rectangle closest to the contact point.
/// A path that starts inside the inflated rectangle reports `t = 0`.
pub fn segment_rect_sweep(p1: Vec2, p2: Vec2, rect: &Rect, inflate: f32) -> Option<SweepHit> {
    let grown = rect.inflate(inflate);
    if grown.contains(p1) {
        return Some(SweepHit {
            t: 0.0,
            edge: grown.closest_edge(p1),
            point: p1,
        });
    }

    let mut best: Option<f32> = None;
    for (_, a, b) in grown.edges() {
        if let Some(t) = segment_segment_intersection_param(p1, p2, a, b) {
            if best.map_or(true, |cur| t < cur) {
                best = Some(t);
            }
        }
    }

    best.map(|t| {
        let point = p1 + (p2 - p1) * t;
        SweepHit {
            t,
            edge: grown.closest_edge(point),
            point,
        }
    })
}

/// Sweep a circle of radius `radius` from `p1` to `p2` against the inside
/// of `bounds`. The centre must stay within `bounds` shrunk by `radius`.
/// `edge` names the boundary side that was crossed.
pub fn segment_bounds_sweep(p1: Vec2, p2: Vec2, bounds: &Rect, radius: f32) -> Option<SweepHit> {
    let min_x = bounds.left() + radius;
    let max_x = bounds.right() - radius;
    let min_y = bounds.top() + radius;
    let max_y = bounds.bottom() - radius;
    let d = p2 - p1;

    let mut best: Option<(f32, RectEdge)> = None;
    let mut consider = |t: f32, edge: RectEdge| {
        if (0.0..=1.0).contains(&t) && best.map_or(true, |(cur, _)| t < cur) {
            best = Some((t, edge));
        }
    };

    if p2.x < min_x && d.x < 0.0 {
        consider(((min_x - p1.x) / d.x).max(0.0), RectEdge::Left);
    }
    if p2.x > max_x && d.x > 0.0 {
        consider(((max_x - p1.x) / d.x).max(0.0), RectEdge::Right);
    }
    if p2.y < min_y && d.y < 0.0 {
        consider(((min_y - p1.y) / d.y).max(0.0), RectEdge::Top);
    }
    if p2.y > max_y && d.y > 0.0 {
        consider(((max_y - p1.y) / d.y).max(0.0), RectEdge::Bottom);
    }

    best.map(|(t, edge)| SweepHit {
        t,
        edge,
        point: p1 + d * t,
    })
}
