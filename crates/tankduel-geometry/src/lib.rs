//! Geometry and collision kernel for TANKDUEL.
//!
//! Pure functions only: no state, no allocation. Every moving-object-vs-wall
//! check in the simulation is phrased as a swept segment against an inflated
//! rectangle so fast projectiles cannot tunnel through thin walls. Plain
//! circle overlap is reserved for slow bodies (tank-vs-tank separation).

pub mod angle;
pub mod overlap;
pub mod rect;
pub mod segment;
pub mod sweep;

pub use angle::{angle_delta, normalize_angle, rotate_towards};
pub use overlap::{circle_circle_overlap, circle_rect_overlap, push_out_of_rect};
pub use rect::{Rect, RectEdge};
pub use segment::{
    point_segment_distance, point_segment_distance_sq, segment_circle_hit,
    segment_segment_intersection_param, segment_segment_intersects,
};
pub use sweep::{segment_bounds_sweep, segment_rect_sweep, SweepHit};
