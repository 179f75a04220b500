//! Simulation-side components that hold ECS handles or per-tick scratch.
//!
//! Plain data lives in `tankduel_core::components`; the types here refer to
//! other entities and so stay next to the world that owns them.

use std::collections::BTreeMap;

use glam::Vec2;
use hecs::Entity;

use tankduel_core::enums::*;
use tankduel_core::types::EntityId;

/// External id for an ECS handle.
pub fn entity_id(entity: Entity) -> EntityId {
    EntityId(entity.to_bits().get())
}

/// Per-entity update strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    PlayerControlled { slot: PlayerSlot },
    BossAi,
    /// Sub-entity linked to a parent boss (brood or split mini).
    Minion { parent: Entity },
}

/// Player control state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Controls {
    pub scheme: ControlScheme,
    pub charge: ChargeState,
}

/// In-flight leap with both ends fixed at cast time.
#[derive(Debug, Clone, Copy)]
pub struct LeapState {
    pub skill: BossSkill,
    pub start: Vec2,
    pub target: Vec2,
    pub started_at_ms: f64,
    pub duration_ms: f64,
    pub easing: Easing,
    pub impact_radius: f32,
    pub damage: f32,
}

/// Boss AI state.
#[derive(Debug, Clone)]
pub struct BossBrain {
    pub archetype: BossArchetype,
    pub phase: BossPhase,
    /// Skill -> last successful cast time.
    pub last_used: BTreeMap<BossSkill, f64>,
    /// Skill currently holding the body, and when it lets go.
    pub casting: Option<(BossSkill, f64)>,
    pub leap: Option<LeapState>,
    pub next_cast_at_ms: f64,
    pub defending_until_ms: Option<f64>,
    pub split_started_at_ms: Option<f64>,
    pub has_split: bool,
    /// A brood is out and has not been wiped yet.
    pub brood_pending: bool,
    pub phase_changes: u32,
}

impl BossBrain {
    pub fn new(archetype: BossArchetype, now_ms: f64, first_cast_delay_ms: f64) -> Self {
        Self {
            archetype,
            phase: BossPhase::Normal,
            last_used: BTreeMap::new(),
            casting: None,
            leap: None,
            next_cast_at_ms: now_ms + first_cast_delay_ms,
            defending_until_ms: None,
            split_started_at_ms: None,
            has_split: false,
            brood_pending: false,
            phase_changes: 0,
        }
    }
}

/// Minion timers.
#[derive(Debug, Clone, Copy)]
pub struct MinionBrain {
    pub next_fire_at_ms: f64,
}

/// One-shot split state of a bullet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCharge {
    Disarmed,
    Armed(SplitTrigger),
    Consumed,
}

/// A live bullet.
#[derive(Debug, Clone)]
pub struct Projectile {
    /// Non-owning back-reference for attribution and self-exclusion.
    pub owner: Entity,
    pub owner_team: Team,
    pub pos: Vec2,
    /// Position at the start of this tick.
    pub prev_pos: Vec2,
    /// Centre path travelled this tick, one point per sub-segment end.
    pub trace: Vec<Vec2>,
    /// Px per reference frame.
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    /// Damage before elemental effects; split children derive from this.
    pub base_damage: f32,
    pub alive: bool,
    pub spawned_at_ms: f64,
    pub expires_at_ms: f64,
    pub bounces: u32,
    pub max_bounces: u32,
    /// Damage kept per buff-granted bounce.
    pub bounce_damage_factor: Option<f32>,
    /// Buff-granted bounces left that still apply the factor.
    pub bounce_budget: u32,
    /// Targets this bullet may still damage.
    pub pierce_left: u32,
    pub pierced: Vec<Entity>,
    /// Wall-pierce budget; a wall is passed only while this is above 1.
    pub wall_pierce: u32,
    /// Obstacle currently being passed through.
    pub phasing: Option<usize>,
    pub homing: bool,
    pub homing_target: Option<Entity>,
    pub explosive: bool,
    pub poison: bool,
    pub trail: bool,
    pub critical: bool,
    pub charged: bool,
    pub element: Option<Element>,
    pub split: SplitCharge,
}

impl Projectile {
    /// Straight single-hit bullet with no traits.
    pub fn plain(owner: Entity, owner_team: Team, pos: Vec2, vel: Vec2, radius: f32, damage: f32, now_ms: f64) -> Self {
        Self {
            owner,
            owner_team,
            pos,
            prev_pos: pos,
            trace: Vec::new(),
            vel,
            radius,
            damage,
            base_damage: damage,
            alive: true,
            spawned_at_ms: now_ms,
            expires_at_ms: now_ms + tankduel_core::constants::BULLET_LIFETIME_MS,
            bounces: 0,
            max_bounces: 0,
            bounce_damage_factor: None,
            bounce_budget: 0,
            pierce_left: 1,
            pierced: Vec::new(),
            wall_pierce: 1,
            phasing: None,
            homing: false,
            homing_target: None,
            explosive: false,
            poison: false,
            trail: false,
            critical: false,
            charged: false,
            element: None,
            split: SplitCharge::Disarmed,
        }
    }

    pub fn heading(&self) -> f32 {
        self.vel.y.atan2(self.vel.x)
    }
}

/// Fire action queued for the firing system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireRequest {
    pub shooter: Entity,
    pub kind: ShotKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotKind {
    Normal,
    Charged,
    /// Free extra bullet from a twin-shot proc.
    Bonus,
}
