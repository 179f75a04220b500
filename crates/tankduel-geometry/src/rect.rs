//! Axis-aligned rectangle used for obstacles and arena bounds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle. `x`,`y` is the top-left corner (y grows downward).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// One of the four sides of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RectEdge {
    Left,
    Right,
    Top,
    Bottom,
}

impl RectEdge {
    /// Outward unit normal of this edge.
    pub fn normal(self) -> Vec2 {
        match self {
            RectEdge::Left => Vec2::new(-1.0, 0.0),
            RectEdge::Right => Vec2::new(1.0, 0.0),
            RectEdge::Top => Vec2::new(0.0, -1.0),
            RectEdge::Bottom => Vec2::new(0.0, 1.0),
        }
    }

    /// True for edges whose normal lies on the x axis.
    pub fn is_vertical(self) -> bool {
        matches!(self, RectEdge::Left | RectEdge::Right)
    }
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Rectangle grown by `r` on every side.
    pub fn inflate(&self, r: f32) -> Rect {
        Rect::new(self.x - r, self.y - r, self.w + 2.0 * r, self.h + 2.0 * r)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Closest point of the rectangle (boundary or interior) to `p`.
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.clamp(self.x, self.right()), p.y.clamp(self.y, self.bottom()))
    }

    /// The four edges as `(edge, a, b)` segments in clockwise order.
    pub fn edges(&self) -> [(RectEdge, Vec2, Vec2); 4] {
        let tl = Vec2::new(self.x, self.y);
        let tr = Vec2::new(self.right(), self.y);
        let br = Vec2::new(self.right(), self.bottom());
        let bl = Vec2::new(self.x, self.bottom());
        [
            (RectEdge::Top, tl, tr),
            (RectEdge::Right, tr, br),
            (RectEdge::Bottom, br, bl),
            (RectEdge::Left, bl, tl),
        ]
    }

    /// Edge whose line is closest to `p`. Ties resolve in the order
    /// left, right, top, bottom.
    pub fn closest_edge(&self, p: Vec2) -> RectEdge {
        let candidates = [
            (RectEdge::Left, (p.x - self.left()).abs()),
            (RectEdge::Right, (p.x - self.right()).abs()),
            (RectEdge::Top, (p.y - self.top()).abs()),
            (RectEdge::Bottom, (p.y - self.bottom()).abs()),
        ];
        let mut best = candidates[0];
        for c in &candidates[1..] {
            if c.1 < best.1 {
                best = *c;
            }
        }
        best.0
    }

    /// True when the two rectangles share any area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}
