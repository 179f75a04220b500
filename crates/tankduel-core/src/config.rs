//! Match configuration.
//!
//! Everything a host may tune per match. Gameplay constants that are not
//! balance knobs live in `constants.rs`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::{BossArchetype, ControlScheme, GameMode};

/// Errors from loading or validating an [`ArenaConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(err) => write!(f, "malformed arena config: {err}"),
            ConfigError::Invalid { field, reason } => {
                write!(f, "invalid arena config field `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

/// Obstacle generation knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleTuning {
    pub count: usize,
    /// Fraction of walls that oscillate, in `[0, 1]`.
    pub moving_fraction: f32,
    /// Minimum corridor width between parallel walls.
    pub min_gap: f32,
    /// Oscillation speed (px per frame).
    pub speed: f32,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            count: OBSTACLE_COUNT,
            moving_fraction: OBSTACLE_MOVING_FRACTION,
            min_gap: OBSTACLE_MIN_GAP,
            speed: OBSTACLE_SPEED,
        }
    }
}

/// Weights of the possessed-control branch. Whatever probability is left
/// over halves the rotation drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PossessionTuning {
    pub accelerate_chance: f64,
    pub decelerate_chance: f64,
}

impl Default for PossessionTuning {
    fn default() -> Self {
        Self {
            accelerate_chance: 0.3,
            decelerate_chance: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeTuning {
    pub threshold_ms: f64,
    pub ammo_cost: u32,
    pub damage_mult: f32,
}

impl Default for ChargeTuning {
    fn default() -> Self {
        Self {
            threshold_ms: CHARGE_THRESHOLD_MS,
            ammo_cost: CHARGE_AMMO_COST,
            damage_mult: CHARGE_DAMAGE_MULT,
        }
    }
}

/// Per-match configuration handed to `CombatEngine::new`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub seed: u64,
    pub mode: GameMode,
    pub width: f32,
    pub height: f32,
    pub control_schemes: [ControlScheme; 2],
    /// First boss fought in `VsBoss` mode.
    pub boss_archetype: BossArchetype,
    pub obstacles: ObstacleTuning,
    pub possession: PossessionTuning,
    pub charge: ChargeTuning,
    pub pickup_interval_ms: f64,
    pub max_live_pickups: usize,
    pub rounds_to_win: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            mode: GameMode::Pvp,
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            control_schemes: [ControlScheme::Manual; 2],
            boss_archetype: BossArchetype::Juggernaut,
            obstacles: ObstacleTuning::default(),
            possession: PossessionTuning::default(),
            charge: ChargeTuning::default(),
            pickup_interval_ms: PICKUP_INTERVAL_MS,
            max_live_pickups: MAX_LIVE_PICKUPS,
            rounds_to_win: ROUNDS_TO_WIN,
        }
    }
}

impl ArenaConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ArenaConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the simulation cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let min_side = 2.0 * (SPAWN_CLEARANCE + TANK_RADIUS);
        if !self.width.is_finite() || self.width < min_side {
            return Err(invalid("width", format!("must be at least {min_side}")));
        }
        if !self.height.is_finite() || self.height < min_side {
            return Err(invalid("height", format!("must be at least {min_side}")));
        }
        if self.obstacles.count > MAX_OBSTACLES {
            return Err(invalid("obstacles.count", format!("must be at most {MAX_OBSTACLES}")));
        }
        if !(0.0..=1.0).contains(&self.obstacles.moving_fraction) {
            return Err(invalid("obstacles.moving_fraction", "must be within [0, 1]".into()));
        }
        if !self.obstacles.min_gap.is_finite() || self.obstacles.min_gap < 0.0 {
            return Err(invalid("obstacles.min_gap", "must be non-negative".into()));
        }
        if !self.obstacles.speed.is_finite() || self.obstacles.speed < 0.0 {
            return Err(invalid("obstacles.speed", "must be non-negative".into()));
        }
        let p = &self.possession;
        let weights_ok = (0.0..=1.0).contains(&p.accelerate_chance)
            && (0.0..=1.0).contains(&p.decelerate_chance)
            && p.accelerate_chance + p.decelerate_chance <= 1.0;
        if !weights_ok {
            return Err(invalid(
                "possession",
                "chances must be within [0, 1] and sum to at most 1".into(),
            ));
        }
        if !self.charge.threshold_ms.is_finite() || self.charge.threshold_ms <= 0.0 {
            return Err(invalid("charge.threshold_ms", "must be positive".into()));
        }
        if self.charge.ammo_cost == 0 || self.charge.ammo_cost > TANK_MAX_AMMO {
            return Err(invalid(
                "charge.ammo_cost",
                format!("must be within 1..={TANK_MAX_AMMO}"),
            ));
        }
        if !self.charge.damage_mult.is_finite() || self.charge.damage_mult < 1.0 {
            return Err(invalid("charge.damage_mult", "must be at least 1".into()));
        }
        if !self.pickup_interval_ms.is_finite() || self.pickup_interval_ms <= 0.0 {
            return Err(invalid("pickup_interval_ms", "must be positive".into()));
        }
        if self.rounds_to_win == 0 {
            return Err(invalid("rounds_to_win", "must be at least 1".into()));
        }
        Ok(())
    }

    /// Copy with out-of-range values pulled back to defaults. Used by the
    /// engine so a bad config degrades instead of failing mid-match.
    pub fn sanitized(&self) -> ArenaConfig {
        if self.validate().is_ok() {
            return self.clone();
        }
        let defaults = ArenaConfig::default();
        let mut out = self.clone();
        if !out.width.is_finite() || out.width < 2.0 * (SPAWN_CLEARANCE + TANK_RADIUS) {
            log::warn!("arena width {} out of range, using {}", out.width, defaults.width);
            out.width = defaults.width;
        }
        if !out.height.is_finite() || out.height < 2.0 * (SPAWN_CLEARANCE + TANK_RADIUS) {
            log::warn!("arena height {} out of range, using {}", out.height, defaults.height);
            out.height = defaults.height;
        }
        if out.obstacles.count > MAX_OBSTACLES {
            log::warn!("obstacle count {} too high, clamping to {}", out.obstacles.count, MAX_OBSTACLES);
            out.obstacles.count = MAX_OBSTACLES;
        }
        out.obstacles.moving_fraction = if out.obstacles.moving_fraction.is_finite() {
            out.obstacles.moving_fraction.clamp(0.0, 1.0)
        } else {
            defaults.obstacles.moving_fraction
        };
        if !out.obstacles.min_gap.is_finite() || out.obstacles.min_gap < 0.0 {
            out.obstacles.min_gap = defaults.obstacles.min_gap;
        }
        if !out.obstacles.speed.is_finite() || out.obstacles.speed < 0.0 {
            out.obstacles.speed = defaults.obstacles.speed;
        }
        let p = &out.possession;
        if !((0.0..=1.0).contains(&p.accelerate_chance)
            && (0.0..=1.0).contains(&p.decelerate_chance)
            && p.accelerate_chance + p.decelerate_chance <= 1.0)
        {
            log::warn!("possession chances out of range, using defaults");
            out.possession = defaults.possession.clone();
        }
        if !out.charge.threshold_ms.is_finite() || out.charge.threshold_ms <= 0.0 {
            out.charge.threshold_ms = defaults.charge.threshold_ms;
        }
        out.charge.ammo_cost = out.charge.ammo_cost.clamp(1, TANK_MAX_AMMO);
        if !out.charge.damage_mult.is_finite() || out.charge.damage_mult < 1.0 {
            out.charge.damage_mult = defaults.charge.damage_mult;
        }
        if !out.pickup_interval_ms.is_finite() || out.pickup_interval_ms <= 0.0 {
            out.pickup_interval_ms = defaults.pickup_interval_ms;
        }
        out.rounds_to_win = out.rounds_to_win.max(1);
        out
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
