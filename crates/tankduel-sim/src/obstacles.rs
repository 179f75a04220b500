//! Obstacle field: rectangular walls, some oscillating between the arena
//! edges, regenerated every round.

use glam::Vec2;
use rand::Rng;

use tankduel_core::config::ObstacleTuning;
use tankduel_core::constants::*;
use tankduel_geometry::{circle_rect_overlap, segment_rect_sweep, Rect, SweepHit};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub rect: Rect,
    /// Px per reference frame; zero for static walls.
    pub vel: Vec2,
}

impl Obstacle {
    pub fn is_horizontal(&self) -> bool {
        self.rect.w >= self.rect.h
    }

    pub fn is_moving(&self) -> bool {
        self.vel != Vec2::ZERO
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObstacleField {
    pub obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    /// Place walls by reject-and-retry. Each wall keeps `min_gap` clear of
    /// every other wall and `SPAWN_CLEARANCE` clear of every spawn point.
    /// The first two walls are one horizontal and one vertical; if either
    /// cannot be placed a fixed fallback wall is used instead.
    pub fn generate<R: Rng + ?Sized>(
        tuning: &ObstacleTuning,
        bounds: &Rect,
        spawns: &[Vec2],
        rng: &mut R,
    ) -> Self {
        let target = tuning.count.clamp(2, MAX_OBSTACLES);
        let mut obstacles: Vec<Obstacle> = Vec::with_capacity(target);

        for i in 0..target {
            let horizontal = match i {
                0 => true,
                1 => false,
                _ => rng.gen_bool(0.5),
            };
            let placed = (0..OBSTACLE_PLACEMENT_ATTEMPTS).find_map(|_| {
                let rect = random_wall(bounds, horizontal, rng);
                let fits = obstacles
                    .iter()
                    .all(|o| !o.rect.inflate(tuning.min_gap).intersects(&rect))
                    && spawns
                        .iter()
                        .all(|&s| !circle_rect_overlap(s, SPAWN_CLEARANCE, &rect));
                fits.then_some(rect)
            });

            let rect = match (placed, i) {
                (Some(rect), _) => rect,
                (None, 0 | 1) => {
                    log::warn!(
                        "obstacle placement failed for {} wall, using fallback",
                        if horizontal { "horizontal" } else { "vertical" }
                    );
                    fallback_wall(bounds, horizontal)
                }
                (None, _) => continue,
            };

            let moving = rng.gen::<f32>() < tuning.moving_fraction;
            let vel = if moving && tuning.speed > 0.0 {
                let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                if horizontal {
                    Vec2::new(tuning.speed * sign, 0.0)
                } else {
                    Vec2::new(0.0, tuning.speed * sign)
                }
            } else {
                Vec2::ZERO
            };
            obstacles.push(Obstacle { rect, vel });
        }

        Self { obstacles }
    }

    /// Move oscillating walls, reflecting at the arena edges.
    pub fn advance(&mut self, bounds: &Rect, frames: f32) {
        for o in self.obstacles.iter_mut().filter(|o| o.is_moving()) {
            o.rect.x += o.vel.x * frames;
            o.rect.y += o.vel.y * frames;
            if o.rect.left() < bounds.left() {
                o.rect.x = bounds.left();
                o.vel.x = o.vel.x.abs();
            } else if o.rect.right() > bounds.right() {
                o.rect.x = bounds.right() - o.rect.w;
                o.vel.x = -o.vel.x.abs();
            }
            if o.rect.top() < bounds.top() {
                o.rect.y = bounds.top();
                o.vel.y = o.vel.y.abs();
            } else if o.rect.bottom() > bounds.bottom() {
                o.rect.y = bounds.bottom() - o.rect.h;
                o.vel.y = -o.vel.y.abs();
            }
        }
    }

    /// Whether a circle at `center` overlaps any wall.
    pub fn blocks_circle(&self, center: Vec2, radius: f32) -> bool {
        self.obstacles
            .iter()
            .any(|o| circle_rect_overlap(center, radius, &o.rect))
    }

    /// Earliest wall contact of a circle of `radius` moving `p1 -> p2`,
    /// ignoring the wall at index `skip`.
    pub fn first_hit(&self, p1: Vec2, p2: Vec2, radius: f32, skip: Option<usize>) -> Option<(usize, SweepHit)> {
        let mut best: Option<(usize, SweepHit)> = None;
        for (i, o) in self.obstacles.iter().enumerate() {
            if Some(i) == skip {
                continue;
            }
            if let Some(hit) = segment_rect_sweep(p1, p2, &o.rect, radius) {
                if best.map_or(true, |(_, b)| hit.t < b.t) {
                    best = Some((i, hit));
                }
            }
        }
        best
    }

    pub fn has_both_orientations(&self) -> bool {
        self.obstacles.iter().any(|o| o.is_horizontal())
            && self.obstacles.iter().any(|o| !o.is_horizontal())
    }

    pub fn rects(&self) -> Vec<Rect> {
        self.obstacles.iter().map(|o| o.rect).collect()
    }
}

fn random_wall<R: Rng + ?Sized>(bounds: &Rect, horizontal: bool, rng: &mut R) -> Rect {
    let len = rng.gen_range(OBSTACLE_MIN_LENGTH..=OBSTACLE_MAX_LENGTH);
    let (w, h) = if horizontal {
        (len, OBSTACLE_THICKNESS)
    } else {
        (OBSTACLE_THICKNESS, len)
    };
    let margin = TANK_RADIUS * 2.0;
    let max_x = (bounds.right() - margin - w).max(bounds.left() + margin);
    let max_y = (bounds.bottom() - margin - h).max(bounds.top() + margin);
    let x = rng.gen_range(bounds.left() + margin..=max_x);
    let y = rng.gen_range(bounds.top() + margin..=max_y);
    Rect::new(x, y, w, h)
}

/// Centre-column walls, clear of the side spawns.
fn fallback_wall(bounds: &Rect, horizontal: bool) -> Rect {
    let c = bounds.center();
    if horizontal {
        Rect::new(
            c.x - OBSTACLE_MIN_LENGTH * 0.5,
            bounds.top() + bounds.h * 0.2,
            OBSTACLE_MIN_LENGTH,
            OBSTACLE_THICKNESS,
        )
    } else {
        Rect::new(
            c.x - OBSTACLE_THICKNESS * 0.5,
            bounds.bottom() - bounds.h * 0.2 - OBSTACLE_MIN_LENGTH,
            OBSTACLE_THICKNESS,
            OBSTACLE_MIN_LENGTH,
        )
    }
}
