//! Boss decision state machine.
//!
//! `Idle/Chasing -> CastingSkill -> Idle/Chasing`. Each tick the simulation
//! hands in a [`BossContext`] and gets back the steering acceleration and,
//! when the boss is free to act, the skill to cast. No ECS dependency.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;

use tankduel_core::constants::*;
use tankduel_core::enums::{BossArchetype, BossPhase, BossSkill};

use crate::profiles::get_profile;
use crate::skills::{select_skill, SkillQuery};

/// Coarse behaviour state of a boss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossMode {
    /// No valid target this tick.
    Idle,
    Chasing,
    /// Mid-ability (telegraph pending, leap in flight, volley queued).
    CastingSkill(BossSkill),
}

/// Which way the range controller pushes the boss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeIntent {
    Hold,
    Approach,
    Retreat,
    Drift,
}

/// Input to the boss FSM for a single boss.
pub struct BossContext<'a> {
    pub archetype: BossArchetype,
    pub phase: BossPhase,
    pub mode: BossMode,
    pub pos: Vec2,
    /// Nearest valid target, if any.
    pub target: Option<Vec2>,
    pub now_ms: f64,
    /// Earliest time the next skill may start.
    pub next_cast_at_ms: f64,
    pub last_used: &'a BTreeMap<BossSkill, f64>,
    pub minions_alive: u32,
}

/// Output from the boss FSM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossDecision {
    pub intent: RangeIntent,
    /// Acceleration in px per frame², to be scaled by elapsed frames.
    pub accel: Vec2,
    /// Heading to face, if a target exists.
    pub facing: Option<f32>,
    pub cast: Option<BossSkill>,
}

impl BossDecision {
    const IDLE: BossDecision = BossDecision {
        intent: RangeIntent::Hold,
        accel: Vec2::ZERO,
        facing: None,
        cast: None,
    };
}

/// Range controller: close in beyond `optimal + margin`, back off inside
/// `optimal - margin`, otherwise drift randomly.
pub fn steer<R: Rng + ?Sized>(
    archetype: BossArchetype,
    pos: Vec2,
    target: Vec2,
    rng: &mut R,
) -> (RangeIntent, Vec2) {
    let profile = get_profile(archetype);
    let offset = target - pos;
    let distance = offset.length();
    let dir = if distance > f32::EPSILON {
        offset / distance
    } else {
        Vec2::X
    };

    if distance > profile.optimal_range + BOSS_RANGE_MARGIN {
        (RangeIntent::Approach, dir * profile.accel)
    } else if distance < profile.optimal_range - BOSS_RANGE_MARGIN {
        (RangeIntent::Retreat, -dir * profile.accel)
    } else {
        let angle = rng.gen_range(-std::f32::consts::PI..std::f32::consts::PI);
        (RangeIntent::Drift, Vec2::from_angle(angle) * BOSS_DRIFT)
    }
}

/// Evaluate one boss for this tick.
pub fn evaluate<R: Rng + ?Sized>(ctx: &BossContext<'_>, rng: &mut R) -> BossDecision {
    let Some(target) = ctx.target else {
        return BossDecision::IDLE;
    };
    let offset = target - ctx.pos;
    let facing = if offset.length_squared() > f32::EPSILON {
        Some(offset.y.atan2(offset.x))
    } else {
        None
    };

    // Leaps and telegraphs own the body until they resolve.
    if let BossMode::CastingSkill(_) = ctx.mode {
        return BossDecision {
            facing,
            ..BossDecision::IDLE
        };
    }

    let (intent, accel) = steer(ctx.archetype, ctx.pos, target, rng);
    let cast = if ctx.now_ms >= ctx.next_cast_at_ms {
        select_skill(&SkillQuery {
            archetype: ctx.archetype,
            phase: ctx.phase,
            now_ms: ctx.now_ms,
            last_used: ctx.last_used,
            distance: offset.length(),
            minions_alive: ctx.minions_alive,
        })
    } else {
        None
    };

    BossDecision {
        intent,
        accel,
        facing,
        cast,
    }
}
