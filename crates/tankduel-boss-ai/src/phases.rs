//! Phase rules: which archetypes change phase, when, and with what HP pool.

use tankduel_core::constants::*;
use tankduel_core::enums::{BossArchetype, BossPhase};

/// Phase entered when the HP pool of `phase` runs out, if any. `None`
/// means the boss is defeated.
pub fn phase_on_depletion(archetype: BossArchetype, phase: BossPhase) -> Option<BossPhase> {
    match (archetype, phase) {
        (BossArchetype::Revenant, BossPhase::Normal) => Some(BossPhase::Corrupted),
        _ => None,
    }
}

/// Whether the boss breaks into minis at its current HP fraction.
pub fn should_split(
    archetype: BossArchetype,
    phase: BossPhase,
    hp_fraction: f32,
    already_split: bool,
) -> bool {
    archetype == BossArchetype::Splitter
        && phase == BossPhase::Normal
        && !already_split
        && hp_fraction <= SPLIT_THRESHOLD
}

/// HP pool the boss holds on entering `to` from `from`. Merging back out
/// of the split form keeps the split pool rather than refilling.
pub fn entry_hp(from: BossPhase, to: BossPhase, max_hp: f32) -> f32 {
    match (from, to) {
        (BossPhase::Split, BossPhase::Normal) => max_hp * SPLIT_MERGE_HP,
        (_, BossPhase::Normal) => max_hp,
        (_, BossPhase::Split) => max_hp * SPLIT_MERGE_HP,
        (_, BossPhase::Corrupted) => max_hp * CORRUPTED_HP,
    }
}
