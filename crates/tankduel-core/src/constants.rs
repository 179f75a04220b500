//! Simulation constants and tuning parameters.
//!
//! Per-frame quantities are expressed per 60 Hz reference frame and scaled
//! by `SimClock::frames()`. Durations are milliseconds.

use std::f32::consts::PI;

/// Length of one reference frame (ms).
pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;

/// Longest frame the simulation will integrate in one tick (ms).
pub const MAX_FRAME_DT_MS: f64 = 100.0;

// --- Arena ---

/// Default arena width (px).
pub const ARENA_WIDTH: f32 = 1000.0;

/// Default arena height (px).
pub const ARENA_HEIGHT: f32 = 700.0;

/// Clearance kept between a tank and the arena edge.
pub const ARENA_MARGIN: f32 = 2.0;

// --- Tanks ---

pub const TANK_RADIUS: f32 = 16.0;
pub const TANK_MAX_HP: f32 = 100.0;
pub const TANK_MAX_AMMO: u32 = 5;

/// Ammo regenerated per second.
pub const TANK_RELOAD_RATE: f32 = 1.25;

/// Speed retained per frame.
pub const TANK_FRICTION: f32 = 0.9;

/// Rotation per frame in manual mode (rad).
pub const TANK_TURN_RATE: f32 = 0.07;

/// Thrust per frame in manual mode (px/frame²).
pub const TANK_ACCEL: f32 = 0.35;

/// Forward speed cap in manual mode (px/frame).
pub const TANK_MAX_SPEED: f32 = 3.2;

/// Strafe speed in focus mode (px/frame).
pub const TANK_MOVE_SPEED: f32 = 3.0;

/// Fraction of the gap closed per frame by the display radius.
pub const DISPLAY_RADIUS_LERP: f32 = 0.15;

/// Velocity kept (and reversed) when a move is fully blocked.
pub const OBSTACLE_BOUNCE_DAMPING: f32 = 0.5;

/// Time a dead tank spends fading before removal (ms).
pub const DEATH_FADE_MS: f64 = 500.0;

// --- Bullets ---

pub const BULLET_SPEED: f32 = 7.0;
pub const BULLET_RADIUS: f32 = 4.0;
pub const BULLET_DAMAGE: f32 = 12.0;
pub const BULLET_LIFETIME_MS: f64 = 4000.0;
pub const BIG_BULLET_RADIUS: f32 = 8.0;
pub const BIG_BULLET_DAMAGE_MULT: f32 = 1.5;

/// Distance from tank centre at which bullets spawn.
pub const MUZZLE_OFFSET: f32 = TANK_RADIUS + 6.0;

pub const RICOCHET_BOUNCES: u32 = 3;

/// Targets a pierce-trait bullet may damage.
pub const PIERCE_TARGETS: u32 = 3;

pub const SHOTGUN_PELLETS: u32 = 5;

/// Total spread of a shotgun blast (rad).
pub const SHOTGUN_SPREAD: f32 = 0.5;
pub const SHOTGUN_DAMAGE_MULT: f32 = 0.6;

/// Lateral offset of the phantom barrel while cloned.
pub const CLONE_OFFSET: f32 = 28.0;

/// Homing turns off this long after spawn.
pub const HOMING_DURATION_MS: f64 = 1500.0;

/// Max heading change per frame for homing bullets (rad).
pub const HOMING_MAX_TURN: f32 = 0.06;

/// Homing bullets within this distance of their owner are "near" it.
pub const HOMING_OWNER_GUARD_RADIUS: f32 = 40.0;

/// Desired turns above this angle near the owner are damped (~108°).
pub const HOMING_SELF_AVOID_ANGLE: f32 = PI * 0.6;

/// Fraction of the clamped turn applied when damped.
pub const HOMING_SELF_AVOID_FACTOR: f32 = 0.25;

pub const EXPLOSION_RADIUS: f32 = 60.0;

/// Flat HP removed by an explosion.
pub const EXPLOSION_DAMAGE: f32 = 20.0;

/// Distance a bounced bullet is pushed clear of the surface.
pub const BOUNCE_NUDGE: f32 = 0.5;

/// Sweep iterations per bullet per tick (one per bounce).
pub const MAX_SWEEP_ITERATIONS: u32 = 4;

pub const CRIT_CHANCE: f64 = 0.10;
pub const CRIT_MULT: f32 = 2.0;
pub const FURY_MULT: f32 = 2.0;

/// Half-angle of the shot-split cone (rad).
pub const SPLIT_SPREAD: f32 = PI / 4.0;

/// Share of the parent's base damage each split child deals.
pub const SPLIT_DAMAGE_FRACTION: f32 = 0.4;

// --- Boss-mode buffs ---

/// Damage kept per pierce stack (floored at `PIERCE_DAMAGE_FLOOR`).
pub const PIERCE_STACK_DAMAGE_FACTOR: f32 = 0.9;
pub const PIERCE_DAMAGE_FLOOR: f32 = 0.5;

/// Damage kept on each buff-granted bounce.
pub const BOUNCE_DAMAGE_FACTOR: f32 = 0.85;

pub const TWIN_SHOT_CHANCE: f64 = 0.25;
pub const LIFE_STEAL_PER_STACK: f32 = 0.10;
pub const MICRO_SHIELD_PER_STACK: f32 = 15.0;

/// Micro-shield regeneration (points per second).
pub const MICRO_SHIELD_REGEN: f32 = 3.0;
pub const MAGNET_RADIUS_PER_STACK: f32 = 120.0;

/// Pickup pull speed inside a magnet radius (px/frame).
pub const MAGNET_PULL: f32 = 4.0;

/// Reload-rate bonus per fire-rate stack.
pub const FIRE_RATE_STACK_BONUS: f32 = 0.25;

/// Move-speed bonus per speed stack.
pub const MOVE_SPEED_STACK_BONUS: f32 = 0.12;

// --- Status effects (durations in ms) ---

pub const HEAL_OVER_TIME_MS: f64 = 4000.0;

/// Healing per second while regenerating.
pub const HEAL_OVER_TIME_RATE: f32 = 10.0;
pub const SPEED_BOOST_MS: f64 = 6000.0;
pub const SPEED_BOOST_MULT: f32 = 1.5;
pub const SHRINK_MS: f64 = 8000.0;
pub const SHRINK_SCALE: f32 = 0.6;
pub const GIANT_MS: f64 = 8000.0;
pub const GIANT_SCALE: f32 = 1.5;
pub const SHIELD_MS: f64 = 5000.0;
pub const RAPID_RELOAD_MS: f64 = 6000.0;
pub const RAPID_RELOAD_MULT: f32 = 3.0;
pub const WEAPON_BUFF_MS: f64 = 8000.0;
pub const RICOCHET_MS: f64 = 10000.0;
pub const FURY_MS: f64 = 5000.0;
pub const INVISIBILITY_MS: f64 = 5000.0;
pub const REVERSE_CONTROLS_MS: f64 = 5000.0;
pub const ROOT_MS: f64 = 2500.0;
pub const SILENCE_MS: f64 = 3000.0;
pub const STUN_MS: f64 = 1200.0;
pub const POSSESSION_MS: f64 = 4000.0;

/// Rotation drift applied per frame while possessed, at most (rad).
pub const POSSESSION_MAX_DRIFT: f32 = 0.08;

/// Poison damage per second per stack.
pub const POISON_DPS_PER_STACK: f32 = 3.0;
pub const POISON_BASE_MS: f64 = 3000.0;
pub const POISON_MS_PER_STACK: f64 = 500.0;
pub const POISON_MAX_STACKS: u32 = 5;

pub const BURN_DPS: f32 = 6.0;
pub const BURN_MS: f64 = 2500.0;
pub const CHILL_SLOW: f32 = 0.5;
pub const CHILL_MS: f64 = 2000.0;

/// Speed factor while inside a hazard field.
pub const HAZARD_SLOW: f32 = 0.6;

/// Lifetime of the slow refreshed each tick inside a hazard (ms).
pub const HAZARD_SLOW_REFRESH_MS: f64 = 250.0;

// --- Charge shot ---

pub const CHARGE_THRESHOLD_MS: f64 = 800.0;
pub const CHARGE_AMMO_COST: u32 = 3;
pub const CHARGE_DAMAGE_MULT: f32 = 2.5;
pub const CHARGE_RADIUS_MULT: f32 = 1.6;
pub const CHARGE_SPEED_MULT: f32 = 1.3;

// --- Pickups ---

pub const PICKUP_RADIUS: f32 = 14.0;
pub const PICKUP_INTERVAL_MS: f64 = 6000.0;
pub const MAX_LIVE_PICKUPS: usize = 3;

// --- Rounds ---

pub const ROUND_OVER_DELAY_MS: f64 = 1500.0;
pub const ROUNDS_TO_WIN: u32 = 5;

/// Spawn points as fractions of arena size.
pub const PLAYER_SPAWNS: [(f32, f32); 2] = [(0.12, 0.5), (0.88, 0.5)];
pub const BOSS_SPAWN: (f32, f32) = (0.75, 0.5);

// --- Obstacles ---

pub const OBSTACLE_COUNT: usize = 7;
/// Most walls a config may ask for.
pub const MAX_OBSTACLES: usize = 64;
pub const OBSTACLE_THICKNESS: f32 = 16.0;
pub const OBSTACLE_MIN_LENGTH: f32 = 90.0;
pub const OBSTACLE_MAX_LENGTH: f32 = 220.0;

/// Minimum corridor between two parallel walls.
pub const OBSTACLE_MIN_GAP: f32 = 60.0;

/// Fraction of obstacles that oscillate.
pub const OBSTACLE_MOVING_FRACTION: f32 = 0.3;

/// Oscillation speed (px/frame).
pub const OBSTACLE_SPEED: f32 = 1.0;

/// Obstacles keep this far from spawn points.
pub const SPAWN_CLEARANCE: f32 = 90.0;
pub const OBSTACLE_PLACEMENT_ATTEMPTS: u32 = 200;

// --- Bosses ---

pub const BOSS_RADIUS: f32 = 30.0;

/// Band around the optimal distance inside which the boss drifts.
pub const BOSS_RANGE_MARGIN: f32 = 40.0;
pub const BOSS_ACCEL: f32 = 0.25;

/// Magnitude of random drift inside the engagement band (px/frame²).
pub const BOSS_DRIFT: f32 = 0.15;

/// Invulnerability after a phase change (ms).
pub const PHASE_TRANSITION_INVULN_MS: f64 = 1500.0;

/// Pause between two boss skills (ms).
pub const BOSS_CAST_GAP_MS: f64 = 1200.0;

/// Grace period before a fresh boss may cast (ms).
pub const BOSS_FIRST_CAST_DELAY_MS: f64 = 1500.0;

/// Telegraph lead time before area damage lands (ms).
pub const TELEGRAPH_DELAY_MS: f64 = 900.0;

pub const GROUND_SLAM_RADIUS: f32 = 120.0;
pub const GROUND_SLAM_DAMAGE: f32 = 25.0;
pub const FORTIFY_MS: f64 = 3000.0;

/// Fraction of incoming damage kept while fortified.
pub const FORTIFY_DAMAGE_TAKEN: f32 = 0.5;
pub const LEAP_DURATION_MS: f64 = 900.0;
pub const LEAP_IMPACT_RADIUS: f32 = 80.0;
pub const LEAP_DAMAGE: f32 = 25.0;
pub const VOLLEY_SHOTS: u32 = 3;
pub const VOLLEY_INTERVAL_MS: f64 = 120.0;
pub const VOLLEY_BULLET_SPEED: f32 = 7.0;
pub const TELEPORT_ATTEMPTS: u32 = 30;

/// Teleport destinations keep at least this far from players.
pub const TELEPORT_MIN_PLAYER_DISTANCE: f32 = 150.0;
pub const BROOD_SIZE: u32 = 3;

/// Share of max HP the Broodmother loses when a whole brood dies.
pub const BROOD_BOND_DAMAGE: f32 = 0.15;
pub const ACID_POOL_RADIUS: f32 = 55.0;
pub const ACID_POOL_MS: f64 = 6000.0;
pub const ACID_POOL_DPS: f32 = 8.0;
pub const SPLITTER_SHOT_COUNT: u32 = 5;
pub const SPLITTER_SHOT_SPREAD: f32 = 0.9;

/// HP fraction at which the Splitter breaks apart.
pub const SPLIT_THRESHOLD: f32 = 0.5;

/// Time the minis have before merging back on their own (ms).
pub const SPLIT_FORM_MS: f64 = 10000.0;

/// HP fraction the Splitter returns with after merging.
pub const SPLIT_MERGE_HP: f32 = 0.35;
pub const SPLIT_MINIS: u32 = 3;
pub const SPLIT_MINI_HP: f32 = 60.0;
pub const SPLIT_MINI_RADIUS: f32 = 14.0;

/// HP pool of the corrupted phase, as a fraction of max HP.
pub const CORRUPTED_HP: f32 = 0.6;
pub const SHADOW_BOLT_DAMAGE_MULT: f32 = 1.5;
pub const NOVA_BULLETS: u32 = 12;
pub const BLIGHT_FIELDS: u32 = 3;
pub const BLIGHT_RADIUS: f32 = 45.0;
pub const BLIGHT_MS: f64 = 5000.0;
pub const BLIGHT_DPS: f32 = 10.0;
pub const BOSS_BULLET_SPEED: f32 = 5.0;
pub const BOSS_BULLET_DAMAGE: f32 = 10.0;
pub const BOSS_BULLET_RADIUS: f32 = 6.0;

// --- Minions ---

pub const MINION_RADIUS: f32 = 11.0;
pub const MINION_HP: f32 = 40.0;
pub const MINION_SPEED: f32 = 2.2;
pub const MINION_FIRE_INTERVAL_MS: f64 = 1500.0;
pub const MINION_BULLET_DAMAGE: f32 = 6.0;
