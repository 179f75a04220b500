//! Arena snapshot: the complete visible state returned after each tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::FxEvent;
use crate::geometry::Rect;
use crate::types::{EntityId, SimClock};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub clock: SimClock,
    pub phase: GamePhase,
    pub mode: GameMode,
    pub round: u32,
    pub scores: [u32; 2],
    pub winner: Option<PlayerSlot>,
    pub bosses_defeated: u32,
    pub tanks: Vec<TankView>,
    pub bullets: Vec<BulletView>,
    pub pickups: Vec<PickupView>,
    pub hazards: Vec<HazardView>,
    pub obstacles: Vec<Rect>,
    pub fx: Vec<FxEvent>,
}

/// A player, boss or minion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TankView {
    pub id: EntityId,
    pub team: Team,
    pub alive: bool,
    pub pos: Vec2,
    pub heading: f32,
    pub radius: f32,
    pub display_radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Zero for bosses and minions.
    pub ammo: u32,
    pub max_ammo: u32,
    pub charge: ChargeState,
    pub invisible: bool,
    pub shielded: bool,
    /// Labels of active status effects, in key order.
    pub effects: Vec<String>,
    pub boss: Option<BossView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossView {
    pub archetype: BossArchetype,
    pub phase: BossPhase,
    pub casting: Option<BossSkill>,
    pub defending: bool,
    pub leaping: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletView {
    pub id: EntityId,
    pub owner: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub critical: bool,
    pub charged: bool,
    /// Rendered with a fading trail.
    pub trail: bool,
    pub element: Option<Element>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupView {
    pub kind: PickupKind,
    pub pos: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardView {
    pub pos: Vec2,
    pub radius: f32,
    pub expires_at_ms: f64,
}
