//! Per-phase skill tables and cooldown/range gated selection.

use std::collections::BTreeMap;

use tankduel_core::enums::{BossArchetype, BossPhase, BossSkill};

/// One entry of a skill table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillSpec {
    pub skill: BossSkill,
    pub cooldown_ms: f64,
    /// Only cast when the target is at most this far away.
    pub max_range: Option<f32>,
}

const fn spec(skill: BossSkill, cooldown_ms: f64, max_range: Option<f32>) -> SkillSpec {
    SkillSpec {
        skill,
        cooldown_ms,
        max_range,
    }
}

const JUGGERNAUT: &[SkillSpec] = &[
    spec(BossSkill::GroundSlam, 4500.0, Some(150.0)),
    spec(BossSkill::Leap, 7000.0, Some(450.0)),
    spec(BossSkill::Fortify, 9000.0, None),
];

const MARKSMAN: &[SkillSpec] = &[
    spec(BossSkill::AimedVolley, 2200.0, Some(650.0)),
    spec(BossSkill::Teleport, 6000.0, None),
];

const BROODMOTHER: &[SkillSpec] = &[
    spec(BossSkill::SpawnBrood, 9000.0, None),
    spec(BossSkill::AcidPool, 5000.0, Some(420.0)),
];

const SPLITTER: &[SkillSpec] = &[spec(BossSkill::SplitterShot, 2000.0, Some(520.0))];

const REVENANT: &[SkillSpec] = &[
    spec(BossSkill::ShadowBolt, 2500.0, Some(600.0)),
    spec(BossSkill::Teleport, 7000.0, None),
];

const REVENANT_CORRUPTED: &[SkillSpec] = &[
    spec(BossSkill::CorruptedNova, 4000.0, None),
    spec(BossSkill::ChargeLeap, 6500.0, Some(450.0)),
    spec(BossSkill::BlightField, 6000.0, Some(500.0)),
];

/// Skills available to an archetype in a phase, in priority order.
/// Empty while the archetype has no abilities in that phase.
pub fn skill_table(archetype: BossArchetype, phase: BossPhase) -> &'static [SkillSpec] {
    match (archetype, phase) {
        (BossArchetype::Juggernaut, BossPhase::Normal) => JUGGERNAUT,
        (BossArchetype::Marksman, BossPhase::Normal) => MARKSMAN,
        (BossArchetype::Broodmother, BossPhase::Normal) => BROODMOTHER,
        (BossArchetype::Splitter, BossPhase::Normal) => SPLITTER,
        (BossArchetype::Revenant, BossPhase::Normal) => REVENANT,
        (BossArchetype::Revenant, BossPhase::Corrupted) => REVENANT_CORRUPTED,
        _ => &[],
    }
}

/// `now - last_used >= cooldown`. A skill never used is ready.
pub fn is_ready(last_used_ms: Option<f64>, now_ms: f64, cooldown_ms: f64) -> bool {
    match last_used_ms {
        Some(last) => now_ms - last >= cooldown_ms,
        None => true,
    }
}

/// Everything skill selection looks at.
pub struct SkillQuery<'a> {
    pub archetype: BossArchetype,
    pub phase: BossPhase,
    pub now_ms: f64,
    pub last_used: &'a BTreeMap<BossSkill, f64>,
    /// Distance to the current target.
    pub distance: f32,
    /// Live minions linked to this boss.
    pub minions_alive: u32,
}

/// First skill in table order that is off cooldown and in range.
pub fn select_skill(query: &SkillQuery<'_>) -> Option<BossSkill> {
    skill_table(query.archetype, query.phase)
        .iter()
        .find(|spec| {
            let ready = is_ready(
                query.last_used.get(&spec.skill).copied(),
                query.now_ms,
                spec.cooldown_ms,
            );
            let in_range = spec.max_range.map_or(true, |r| query.distance <= r);
            let allowed = match spec.skill {
                BossSkill::SpawnBrood => query.minions_alive == 0,
                _ => true,
            };
            ready && in_range && allowed
        })
        .map(|spec| spec.skill)
}
