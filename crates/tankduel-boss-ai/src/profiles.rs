//! Archetype-specific boss profiles.
//!
//! Consolidates per-archetype base stats and engagement parameters.

use tankduel_core::constants::*;
use tankduel_core::enums::BossArchetype;
use tankduel_core::types::Color;

/// Base stats and engagement parameters for a boss archetype.
pub struct BossProfile {
    pub max_hp: f32,
    pub radius: f32,
    /// Distance the boss tries to hold from its target (px).
    pub optimal_range: f32,
    /// Thrust per frame while closing or opening distance.
    pub accel: f32,
    /// Speed cap (px per frame).
    pub max_speed: f32,
    pub friction: f32,
    /// Damage of the archetype's plain bullets.
    pub bullet_damage: f32,
    pub color: Color,
}

/// Get the profile for an archetype.
pub fn get_profile(archetype: BossArchetype) -> BossProfile {
    match archetype {
        BossArchetype::Juggernaut => BossProfile {
            max_hp: 600.0,
            radius: BOSS_RADIUS * 1.2,
            optimal_range: 110.0,
            accel: BOSS_ACCEL * 0.8,
            max_speed: 1.8,
            friction: 0.92,
            bullet_damage: BOSS_BULLET_DAMAGE * 1.2,
            color: Color::RED,
        },
        BossArchetype::Marksman => BossProfile {
            max_hp: 420.0,
            radius: BOSS_RADIUS * 0.9,
            optimal_range: 360.0,
            accel: BOSS_ACCEL * 1.2,
            max_speed: 2.6,
            friction: 0.9,
            bullet_damage: BOSS_BULLET_DAMAGE,
            color: Color::BLUE,
        },
        BossArchetype::Broodmother => BossProfile {
            max_hp: 500.0,
            radius: BOSS_RADIUS * 1.1,
            optimal_range: 260.0,
            accel: BOSS_ACCEL,
            max_speed: 2.0,
            friction: 0.9,
            bullet_damage: BOSS_BULLET_DAMAGE * 0.8,
            color: Color::TOXIC,
        },
        BossArchetype::Splitter => BossProfile {
            max_hp: 480.0,
            radius: BOSS_RADIUS,
            optimal_range: 200.0,
            accel: BOSS_ACCEL,
            max_speed: 2.2,
            friction: 0.9,
            bullet_damage: BOSS_BULLET_DAMAGE,
            color: Color::ORANGE,
        },
        BossArchetype::Revenant => BossProfile {
            max_hp: 450.0,
            radius: BOSS_RADIUS,
            optimal_range: 240.0,
            accel: BOSS_ACCEL * 1.1,
            max_speed: 2.4,
            friction: 0.9,
            bullet_damage: BOSS_BULLET_DAMAGE,
            color: Color::PURPLE,
        },
    }
}
