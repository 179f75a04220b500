//! ECS components for hecs entities.
//!
//! Components are plain data. The only methods here are the clamped
//! mutators that keep HP and ammo inside their bounds; game logic lives in
//! systems.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::*;

/// Faction and liveness shared by every combatant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Combatant {
    pub team: Team,
    /// Cleared when HP reaches zero. The entity fades out and is despawned
    /// by the cleanup system.
    pub alive: bool,
    /// When the entity died, for the fade-out timer.
    pub died_at_ms: Option<f64>,
    /// Body out of play (split form): no collisions, no hits.
    pub intangible: bool,
}

impl Combatant {
    pub fn new(team: Team) -> Self {
        Self {
            team,
            alive: true,
            died_at_ms: None,
            intangible: false,
        }
    }
}

/// Position, velocity and heading.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Kinematics {
    pub pos: Vec2,
    /// Velocity in px per reference frame. In manual mode this is derived
    /// from `heading` and `speed`.
    pub vel: Vec2,
    /// Heading in radians (`atan2` convention, y down).
    pub heading: f32,
    /// Scalar forward speed used by manual control.
    pub speed: f32,
}

impl Kinematics {
    pub fn at(pos: Vec2, heading: f32) -> Self {
        Self {
            pos,
            heading,
            ..Default::default()
        }
    }
}

/// Collision radius and its smoothed display counterpart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Collider {
    pub base_radius: f32,
    /// Logical collision radius (`base_radius` times the size modifiers).
    pub radius: f32,
    /// Rendered radius, eased toward `radius` every tick.
    pub display_radius: f32,
    pub shrink_scale: f32,
    pub giant_scale: f32,
}

impl Collider {
    pub fn new(radius: f32) -> Self {
        Self {
            base_radius: radius,
            radius,
            display_radius: radius,
            shrink_scale: 1.0,
            giant_scale: 1.0,
        }
    }

    /// Recompute the logical radius after a size modifier changes.
    pub fn refresh(&mut self) {
        self.radius = (self.base_radius * self.shrink_scale * self.giant_scale).max(1.0);
    }
}

/// Hit points. `0 <= hp <= max_hp` holds after every mutation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub hp: f32,
    pub max_hp: f32,
}

impl Health {
    pub fn new(max_hp: f32) -> Self {
        let max_hp = if max_hp.is_finite() { max_hp.max(0.0) } else { 0.0 };
        Self { hp: max_hp, max_hp }
    }

    /// Remove up to `amount` HP. Returns the HP actually lost.
    pub fn damage(&mut self, amount: f32) -> f32 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.hp;
        self.hp = (self.hp - amount).clamp(0.0, self.max_hp);
        before - self.hp
    }

    /// Restore up to `amount` HP. Returns the HP actually gained.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.hp;
        self.hp = (self.hp + amount).clamp(0.0, self.max_hp);
        self.hp - before
    }

    /// Replace the pool, e.g. on a boss phase change.
    pub fn reset_to(&mut self, hp: f32) {
        self.hp = if hp.is_finite() {
            hp.clamp(0.0, self.max_hp)
        } else {
            self.max_hp
        };
    }

    pub fn fraction(&self) -> f32 {
        if self.max_hp <= 0.0 {
            0.0
        } else {
            self.hp / self.max_hp
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.hp <= 0.0
    }
}

/// Ammunition and reload economy. `0 <= current <= max` always holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ammo {
    pub current: u32,
    pub max: u32,
    /// Rounds regenerated per second before multipliers.
    pub reload_rate: f32,
    /// Fractional progress toward the next round, in `[0, 1)`.
    pub reload_progress: f32,
    /// Multiplier from rapid-reload style effects.
    pub reload_mult: f32,
}

impl Ammo {
    pub fn new(max: u32, reload_rate: f32) -> Self {
        Self {
            current: max,
            max,
            reload_rate,
            reload_progress: 0.0,
            reload_mult: 1.0,
        }
    }

    /// Spend `cost` rounds. Fails without side effects if short.
    pub fn try_spend(&mut self, cost: u32) -> bool {
        if self.current < cost {
            return false;
        }
        self.current -= cost;
        true
    }

    /// Regenerate over `dt_secs` seconds with an extra rate multiplier.
    pub fn reload(&mut self, dt_secs: f32, extra_mult: f32) {
        if self.current >= self.max {
            self.current = self.max;
            self.reload_progress = 0.0;
            return;
        }
        let rate = self.reload_rate * self.reload_mult * extra_mult;
        if !rate.is_finite() || rate <= 0.0 || !dt_secs.is_finite() || dt_secs <= 0.0 {
            return;
        }
        self.reload_progress += rate * dt_secs;
        while self.reload_progress >= 1.0 && self.current < self.max {
            self.reload_progress -= 1.0;
            self.current += 1;
        }
        if self.current >= self.max {
            self.reload_progress = 0.0;
        }
    }

    pub fn refill(&mut self) {
        self.current = self.max;
        self.reload_progress = 0.0;
    }
}

/// Movement tuning plus the modifiers that status effects toggle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Mobility {
    pub friction: f32,
    pub turn_rate: f32,
    pub accel: f32,
    pub max_speed: f32,
    /// Strafe speed in focus mode.
    pub move_speed: f32,
    pub speed_mult: f32,
    pub chill_factor: f32,
    pub hazard_factor: f32,
    pub rooted: bool,
    pub stunned: bool,
    pub reversed: bool,
    pub possessed: bool,
    /// Random rotation drift while possessed (rad per frame).
    pub possession_drift: f32,
}

impl Default for Mobility {
    fn default() -> Self {
        Self {
            friction: TANK_FRICTION,
            turn_rate: TANK_TURN_RATE,
            accel: TANK_ACCEL,
            max_speed: TANK_MAX_SPEED,
            move_speed: TANK_MOVE_SPEED,
            speed_mult: 1.0,
            chill_factor: 1.0,
            hazard_factor: 1.0,
            rooted: false,
            stunned: false,
            reversed: false,
            possessed: false,
            possession_drift: 0.0,
        }
    }
}

impl Mobility {
    /// Combined speed multiplier from boosts and slows.
    pub fn effective_speed_mult(&self) -> f32 {
        self.speed_mult * self.chill_factor * self.hazard_factor
    }
}

/// Weapon traits granted by pickups. Each flag is owned by exactly one
/// status effect's start/end hooks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WeaponTraits {
    pub homing: bool,
    pub big_bullet: bool,
    pub ricochet: bool,
    pub shotgun: bool,
    pub explosive: bool,
    pub pierce: bool,
    pub poison: bool,
    pub trail: bool,
    pub fury: bool,
    pub clone: bool,
    pub elemental: bool,
    pub silenced: bool,
}

/// Base weapon numbers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Weapon {
    pub damage: f32,
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    pub damage_mult: f32,
}

impl Default for Weapon {
    fn default() -> Self {
        Self {
            damage: BULLET_DAMAGE,
            bullet_speed: BULLET_SPEED,
            bullet_radius: BULLET_RADIUS,
            damage_mult: 1.0,
        }
    }
}

/// Stacks of permanent boss-mode rewards. Raised by each blessing's start
/// hook and lowered by its end hook.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BossBuffStats {
    pub life_steal: u32,
    pub bounce: u32,
    pub pierce: u32,
    pub fire_rate: u32,
    pub move_speed: u32,
    pub twin_shot: u32,
    pub magnet: u32,
    pub critical: u32,
    pub guardian: u32,
    pub shot_split: u32,
    pub micro_shield: u32,
    /// Guardian shield armed for this round.
    pub shield_ready: bool,
    /// Remaining micro-shield absorb.
    pub micro_shield_hp: f32,
}

impl BossBuffStats {
    pub fn life_steal_fraction(&self) -> f32 {
        self.life_steal as f32 * LIFE_STEAL_PER_STACK
    }

    pub fn magnet_radius(&self) -> f32 {
        self.magnet as f32 * MAGNET_RADIUS_PER_STACK
    }

    pub fn micro_shield_max(&self) -> f32 {
        self.micro_shield as f32 * MICRO_SHIELD_PER_STACK
    }

    pub fn reload_mult(&self) -> f32 {
        1.0 + self.fire_rate as f32 * FIRE_RATE_STACK_BONUS
    }

    pub fn move_speed_mult(&self) -> f32 {
        1.0 + self.move_speed as f32 * MOVE_SPEED_STACK_BONUS
    }
}

/// Incoming-damage modifiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Defense {
    /// Pickup shield: negates every hit while active.
    pub shielded: bool,
    /// Fraction of damage kept (boss fortify lowers it).
    pub damage_taken_mult: f32,
    /// Untouchable until this time (phase changes).
    pub invulnerable_until_ms: f64,
}

impl Default for Defense {
    fn default() -> Self {
        Self {
            shielded: false,
            damage_taken_mult: 1.0,
            invulnerable_until_ms: 0.0,
        }
    }
}

/// Whether other entities can see and target this one.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Visibility {
    pub invisible: bool,
}
