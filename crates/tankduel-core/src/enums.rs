//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Match mode. Gates collision-exclusion rules and buff pools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Two players shoot each other.
    #[default]
    Pvp,
    /// Players cooperate against a boss.
    VsBoss,
}

/// Top-level match phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Lobby,
    Active,
    Paused,
    /// A round ended; the arena resets once `until_ms` is reached.
    RoundOver { until_ms: f64 },
    MatchOver,
}

/// Player control scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlScheme {
    /// Rotate with left/right, thrust with forward/back.
    #[default]
    Manual,
    /// Auto-aim at the nearest opponent, strafe on both axes.
    Focus,
}

/// Player seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    pub fn index(self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }

    pub fn other(self) -> PlayerSlot {
        match self {
            PlayerSlot::One => PlayerSlot::Two,
            PlayerSlot::Two => PlayerSlot::One,
        }
    }
}

/// Which side an entity fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Player(PlayerSlot),
    /// Bosses and their minions.
    Boss,
}

impl Team {
    pub fn is_boss(self) -> bool {
        matches!(self, Team::Boss)
    }
}

/// Charge-shot state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum ChargeState {
    #[default]
    Idle,
    /// Fire held since `started_at_ms`, threshold not yet reached.
    Charging { started_at_ms: f64 },
    /// Threshold reached; releasing fires a charged shot.
    Armed { started_at_ms: f64 },
}

/// Elemental ammunition type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Ice,
}

/// When a shot-split bullet fans out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitTrigger {
    /// On any wall contact, or when a target hit would consume the bullet.
    OnImpact,
    /// On every enemy hit, even if the bullet could keep piercing.
    OnEnemyHit,
}

/// Buff pickup types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    Heal,
    SpeedBoost,
    Shrink,
    Shield,
    RapidReload,
    Clone,
    Shotgun,
    Ricochet,
    Homing,
    BigBullet,
    Explosive,
    Pierce,
    Poison,
    Trail,
    Fury,
    ElementalAmmo,
    Invisibility,
    Giant,
    ReverseControls,
    Root,
    Silence,
    Possession,
}

impl PickupKind {
    pub const ALL: [PickupKind; 22] = [
        PickupKind::Heal,
        PickupKind::SpeedBoost,
        PickupKind::Shrink,
        PickupKind::Shield,
        PickupKind::RapidReload,
        PickupKind::Clone,
        PickupKind::Shotgun,
        PickupKind::Ricochet,
        PickupKind::Homing,
        PickupKind::BigBullet,
        PickupKind::Explosive,
        PickupKind::Pierce,
        PickupKind::Poison,
        PickupKind::Trail,
        PickupKind::Fury,
        PickupKind::ElementalAmmo,
        PickupKind::Invisibility,
        PickupKind::Giant,
        PickupKind::ReverseControls,
        PickupKind::Root,
        PickupKind::Silence,
        PickupKind::Possession,
    ];

    /// Debuffs land on the nearest opponent of the collector.
    pub fn targets_opponent(self) -> bool {
        matches!(
            self,
            PickupKind::Giant
                | PickupKind::ReverseControls
                | PickupKind::Root
                | PickupKind::Silence
                | PickupKind::Possession
        )
    }

    /// Whether this pickup may spawn in the given mode.
    pub fn available_in(self, mode: GameMode) -> bool {
        match mode {
            GameMode::Pvp => true,
            GameMode::VsBoss => !matches!(
                self,
                PickupKind::ReverseControls | PickupKind::Possession | PickupKind::Giant
            ),
        }
    }
}

/// Permanent boss-mode rewards, retained across rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BossBuff {
    LifeSteal,
    BounceShot,
    PierceShot,
    RapidFire,
    Swiftness,
    TwinShot,
    Magnet,
    Critical,
    Guardian,
    ShotSplit,
    MicroShield,
}

impl BossBuff {
    pub const ALL: [BossBuff; 11] = [
        BossBuff::LifeSteal,
        BossBuff::BounceShot,
        BossBuff::PierceShot,
        BossBuff::RapidFire,
        BossBuff::Swiftness,
        BossBuff::TwinShot,
        BossBuff::Magnet,
        BossBuff::Critical,
        BossBuff::Guardian,
        BossBuff::ShotSplit,
        BossBuff::MicroShield,
    ];
}

/// Closed set of status-effect keys. At most one active effect per key
/// per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EffectKind {
    HealOverTime,
    SpeedBoost,
    Shrink,
    Shield,
    RapidReload,
    Clone,
    Shotgun,
    Ricochet,
    Homing,
    BigBullet,
    Explosive,
    Pierce,
    PoisonAmmo,
    Trail,
    Fury,
    ElementalAmmo,
    Invisibility,
    Giant,
    ReverseControls,
    Root,
    Silence,
    Stun,
    Possessed,
    /// Stacking damage-over-time from poison ammunition.
    Poisoned,
    /// Fire ammunition damage-over-time.
    Burn,
    /// Ice ammunition slow.
    Chill,
    /// Slow applied while standing in a hazard field.
    HazardSlow,
    /// Permanent boss-mode reward.
    Blessing(BossBuff),
}

impl EffectKind {
    /// Short label for status text and snapshots.
    pub fn label(self) -> &'static str {
        match self {
            EffectKind::HealOverTime => "REGEN",
            EffectKind::SpeedBoost => "SPEED",
            EffectKind::Shrink => "SHRINK",
            EffectKind::Shield => "SHIELD",
            EffectKind::RapidReload => "RAPID",
            EffectKind::Clone => "CLONE",
            EffectKind::Shotgun => "SHOTGUN",
            EffectKind::Ricochet => "RICOCHET",
            EffectKind::Homing => "HOMING",
            EffectKind::BigBullet => "BIG SHOT",
            EffectKind::Explosive => "EXPLOSIVE",
            EffectKind::Pierce => "PIERCE",
            EffectKind::PoisonAmmo => "POISON AMMO",
            EffectKind::Trail => "TRAIL",
            EffectKind::Fury => "FURY",
            EffectKind::ElementalAmmo => "ELEMENTAL",
            EffectKind::Invisibility => "INVISIBLE",
            EffectKind::Giant => "GIANT",
            EffectKind::ReverseControls => "REVERSED",
            EffectKind::Root => "ROOTED",
            EffectKind::Silence => "SILENCED",
            EffectKind::Stun => "STUNNED",
            EffectKind::Possessed => "POSSESSED",
            EffectKind::Poisoned => "POISONED",
            EffectKind::Burn => "BURNING",
            EffectKind::Chill => "CHILLED",
            EffectKind::HazardSlow => "SLOWED",
            EffectKind::Blessing(_) => "BLESSING",
        }
    }
}

/// Boss archetypes. Bosses cycle through these in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossArchetype {
    #[default]
    Juggernaut,
    Marksman,
    Broodmother,
    Splitter,
    Revenant,
}

impl BossArchetype {
    /// Next boss after this one is defeated.
    pub fn next(self) -> BossArchetype {
        match self {
            BossArchetype::Juggernaut => BossArchetype::Marksman,
            BossArchetype::Marksman => BossArchetype::Broodmother,
            BossArchetype::Broodmother => BossArchetype::Splitter,
            BossArchetype::Splitter => BossArchetype::Revenant,
            BossArchetype::Revenant => BossArchetype::Juggernaut,
        }
    }
}

/// Boss combat phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossPhase {
    #[default]
    Normal,
    /// Body hidden while minis fight; merges back when they are gone.
    Split,
    /// Secondary phase entered after the primary HP pool is depleted.
    Corrupted,
}

/// Boss abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BossSkill {
    GroundSlam,
    Fortify,
    Leap,
    AimedVolley,
    Teleport,
    SpawnBrood,
    AcidPool,
    SplitterShot,
    ShadowBolt,
    CorruptedNova,
    BlightField,
    ChargeLeap,
}

/// Interpolation curve for leap-style abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    EaseInOut,
    /// Crouch slightly backwards, then launch.
    ChargeThenLeap,
}

/// Flavour of a floating damage number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageKind {
    Normal,
    Critical,
    Explosion,
    DamageOverTime,
    Hazard,
    Heal,
    Blocked,
    Absorbed,
}
