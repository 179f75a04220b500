//! Status effect engine.
//!
//! Each combatant carries a [`StatusEffects`] store keyed by the closed
//! [`EffectKind`] enum, so at most one effect per key can be active. The
//! store owns timing (start, duration, cancellation, expiry against the
//! simulation clock); what an effect *does* is delegated to an
//! [`EffectHost`] through start/end/update hooks.
//!
//! Teardown order is always remove-then-hook: an effect leaves the map before
//! its end hook runs, so a hook can never observe or re-end its own effect.

use std::collections::BTreeMap;

use tankduel_core::components::*;
use tankduel_core::constants::*;
use tankduel_core::enums::{BossBuff, EffectKind};

/// Typed per-effect state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectPayload {
    Plain,
    Regen { hp_per_sec: f32 },
    /// Stacking damage over time (poison).
    Stacks { count: u32, dps: f32 },
    /// Flat damage over time (burn).
    Dot { dps: f32 },
    /// Movement factor in `(0, 1]`.
    Slow { factor: f32 },
    /// Possession rotation drift (rad per frame).
    Drift { rad_per_frame: f32 },
    Blessing { stacks: u32 },
}

/// One active effect.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectState {
    pub kind: EffectKind,
    pub started_at_ms: f64,
    /// `None` is infinite.
    pub duration_ms: Option<f64>,
    /// Skips `on_update` once set; teardown still runs on expiry/reset.
    pub cancelled: bool,
    pub payload: EffectPayload,
}

impl EffectState {
    pub fn expires_at_ms(&self) -> Option<f64> {
        self.duration_ms.map(|d| self.started_at_ms + d)
    }

    fn expired(&self, now_ms: f64) -> bool {
        self.expires_at_ms().is_some_and(|end| now_ms >= end)
    }
}

/// Receiver of effect hooks.
pub trait EffectHost {
    fn on_start(&mut self, kind: EffectKind, payload: &EffectPayload);
    fn on_end(&mut self, kind: EffectKind, payload: &EffectPayload);
    fn on_update(&mut self, kind: EffectKind, payload: &mut EffectPayload, dt_secs: f32);
}

/// Per-entity effect store.
#[derive(Debug, Clone, Default)]
pub struct StatusEffects {
    active: BTreeMap<EffectKind, EffectState>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `kind`. A prior effect under the same key is removed and its
    /// end hook fires before the new start hook.
    pub fn apply(
        &mut self,
        host: &mut dyn EffectHost,
        kind: EffectKind,
        now_ms: f64,
        duration_ms: Option<f64>,
        payload: EffectPayload,
    ) -> &mut EffectState {
        if let Some(prev) = self.active.remove(&kind) {
            host.on_end(prev.kind, &prev.payload);
        }
        let state = EffectState {
            kind,
            started_at_ms: now_ms,
            duration_ms: duration_ms.filter(|d| d.is_finite()).map(|d| d.max(0.0)),
            cancelled: false,
            payload,
        };
        host.on_start(kind, &state.payload);
        self.active.entry(kind).or_insert(state)
    }

    /// Push the expiry of an active effect to `until_ms` without re-running
    /// its hooks. Returns false if the effect is not active.
    pub fn extend(&mut self, kind: EffectKind, until_ms: f64) -> bool {
        match self.active.get_mut(&kind) {
            Some(state) => {
                if let Some(end) = state.expires_at_ms() {
                    if until_ms > end {
                        state.duration_ms = Some(until_ms - state.started_at_ms);
                    }
                }
                true
            }
            None => false,
        }
    }

    /// Stop per-tick updates without tearing the effect down.
    pub fn cancel(&mut self, kind: EffectKind) {
        if let Some(state) = self.active.get_mut(&kind) {
            state.cancelled = true;
        }
    }

    /// Tear down one effect now.
    pub fn remove(&mut self, host: &mut dyn EffectHost, kind: EffectKind) -> bool {
        match self.active.remove(&kind) {
            Some(state) => {
                host.on_end(state.kind, &state.payload);
                true
            }
            None => false,
        }
    }

    /// Run update hooks, then expire everything whose time is up.
    pub fn tick(&mut self, host: &mut dyn EffectHost, now_ms: f64, dt_secs: f32) {
        for state in self.active.values_mut() {
            if !state.cancelled && !state.expired(now_ms) {
                host.on_update(state.kind, &mut state.payload, dt_secs);
            }
        }
        let expired: Vec<EffectKind> = self
            .active
            .values()
            .filter(|s| s.expired(now_ms))
            .map(|s| s.kind)
            .collect();
        for kind in expired {
            self.remove(host, kind);
        }
    }

    /// Cancel and tear down every effect, firing each end hook once.
    pub fn reset(&mut self, host: &mut dyn EffectHost) {
        let all = std::mem::take(&mut self.active);
        for (_, mut state) in all {
            state.cancelled = true;
            host.on_end(state.kind, &state.payload);
        }
    }

    pub fn has(&self, kind: EffectKind) -> bool {
        self.active.contains_key(&kind)
    }

    pub fn get(&self, kind: EffectKind) -> Option<&EffectState> {
        self.active.get(&kind)
    }

    /// Current stack count of a stacking effect, 0 if absent.
    pub fn stacks_of(&self, kind: EffectKind) -> u32 {
        match self.active.get(&kind).map(|s| s.payload) {
            Some(EffectPayload::Stacks { count, .. }) => count,
            Some(EffectPayload::Blessing { stacks }) => stacks,
            Some(_) => 1,
            None => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectState> {
        self.active.values()
    }
}

/// Default duration and payload for an effect applied without extra context.
pub fn standard_effect(kind: EffectKind) -> (Option<f64>, EffectPayload) {
    match kind {
        EffectKind::HealOverTime => (
            Some(HEAL_OVER_TIME_MS),
            EffectPayload::Regen {
                hp_per_sec: HEAL_OVER_TIME_RATE,
            },
        ),
        EffectKind::SpeedBoost => (Some(SPEED_BOOST_MS), EffectPayload::Plain),
        EffectKind::Shrink => (Some(SHRINK_MS), EffectPayload::Plain),
        EffectKind::Giant => (Some(GIANT_MS), EffectPayload::Plain),
        EffectKind::Shield => (Some(SHIELD_MS), EffectPayload::Plain),
        EffectKind::RapidReload => (Some(RAPID_RELOAD_MS), EffectPayload::Plain),
        EffectKind::Ricochet => (Some(RICOCHET_MS), EffectPayload::Plain),
        EffectKind::Fury => (Some(FURY_MS), EffectPayload::Plain),
        EffectKind::Invisibility => (Some(INVISIBILITY_MS), EffectPayload::Plain),
        EffectKind::ReverseControls => (Some(REVERSE_CONTROLS_MS), EffectPayload::Plain),
        EffectKind::Root => (Some(ROOT_MS), EffectPayload::Plain),
        EffectKind::Silence => (Some(SILENCE_MS), EffectPayload::Plain),
        EffectKind::Stun => (Some(STUN_MS), EffectPayload::Plain),
        EffectKind::Possessed => (
            Some(POSSESSION_MS),
            EffectPayload::Drift {
                rad_per_frame: POSSESSION_MAX_DRIFT,
            },
        ),
        EffectKind::Poisoned => (
            Some(POISON_BASE_MS + POISON_MS_PER_STACK),
            EffectPayload::Stacks {
                count: 1,
                dps: POISON_DPS_PER_STACK,
            },
        ),
        EffectKind::Burn => (Some(BURN_MS), EffectPayload::Dot { dps: BURN_DPS }),
        EffectKind::Chill => (Some(CHILL_MS), EffectPayload::Slow { factor: CHILL_SLOW }),
        EffectKind::HazardSlow => (
            Some(HAZARD_SLOW_REFRESH_MS),
            EffectPayload::Slow { factor: HAZARD_SLOW },
        ),
        EffectKind::Blessing(_) => (None, EffectPayload::Blessing { stacks: 1 }),
        EffectKind::Clone
        | EffectKind::Shotgun
        | EffectKind::Homing
        | EffectKind::BigBullet
        | EffectKind::Explosive
        | EffectKind::Pierce
        | EffectKind::PoisonAmmo
        | EffectKind::Trail
        | EffectKind::ElementalAmmo => (Some(WEAPON_BUFF_MS), EffectPayload::Plain),
    }
}

/// Duration and payload for the next poison stack on top of `current`.
pub fn next_poison_stack(current: u32) -> (Option<f64>, EffectPayload) {
    let count = (current + 1).min(POISON_MAX_STACKS);
    (
        Some(POISON_BASE_MS + POISON_MS_PER_STACK * count as f64),
        EffectPayload::Stacks {
            count,
            dps: POISON_DPS_PER_STACK * count as f32,
        },
    )
}

/// Hooks for a combatant, borrowing the components effects touch.
pub struct TankHost<'a> {
    pub mobility: &'a mut Mobility,
    pub collider: &'a mut Collider,
    pub traits: &'a mut WeaponTraits,
    pub ammo: &'a mut Ammo,
    pub health: &'a mut Health,
    pub defense: &'a mut Defense,
    pub visibility: &'a mut Visibility,
    pub buffs: &'a mut BossBuffStats,
    /// Damage over time accrued during `tick`, applied by the caller
    /// through the damage pipeline.
    pub pending_dot: f32,
    pub healed: f32,
}

impl<'a> TankHost<'a> {
    fn set_trait(&mut self, kind: EffectKind, on: bool) -> bool {
        let t = &mut *self.traits;
        let slot = match kind {
            EffectKind::Clone => &mut t.clone,
            EffectKind::Shotgun => &mut t.shotgun,
            EffectKind::Ricochet => &mut t.ricochet,
            EffectKind::Homing => &mut t.homing,
            EffectKind::BigBullet => &mut t.big_bullet,
            EffectKind::Explosive => &mut t.explosive,
            EffectKind::Pierce => &mut t.pierce,
            EffectKind::PoisonAmmo => &mut t.poison,
            EffectKind::Trail => &mut t.trail,
            EffectKind::Fury => &mut t.fury,
            EffectKind::ElementalAmmo => &mut t.elemental,
            EffectKind::Silence => &mut t.silenced,
            _ => return false,
        };
        *slot = on;
        true
    }

    fn blessing_stacks(&mut self, buff: BossBuff, delta: i64) {
        let b = &mut *self.buffs;
        let slot = match buff {
            BossBuff::LifeSteal => &mut b.life_steal,
            BossBuff::BounceShot => &mut b.bounce,
            BossBuff::PierceShot => &mut b.pierce,
            BossBuff::RapidFire => &mut b.fire_rate,
            BossBuff::Swiftness => &mut b.move_speed,
            BossBuff::TwinShot => &mut b.twin_shot,
            BossBuff::Magnet => &mut b.magnet,
            BossBuff::Critical => &mut b.critical,
            BossBuff::Guardian => &mut b.guardian,
            BossBuff::ShotSplit => &mut b.shot_split,
            BossBuff::MicroShield => &mut b.micro_shield,
        };
        *slot = (*slot as i64 + delta).max(0) as u32;
        match buff {
            BossBuff::Guardian => b.shield_ready = b.guardian > 0,
            BossBuff::MicroShield => b.micro_shield_hp = b.micro_shield_max(),
            _ => {}
        }
    }
}

impl<'a> EffectHost for TankHost<'a> {
    fn on_start(&mut self, kind: EffectKind, payload: &EffectPayload) {
        if self.set_trait(kind, true) {
            return;
        }
        match (kind, *payload) {
            (EffectKind::SpeedBoost, _) => self.mobility.speed_mult = SPEED_BOOST_MULT,
            (EffectKind::Shrink, _) => {
                self.collider.shrink_scale = SHRINK_SCALE;
                self.collider.refresh();
            }
            (EffectKind::Giant, _) => {
                self.collider.giant_scale = GIANT_SCALE;
                self.collider.refresh();
            }
            (EffectKind::Shield, _) => self.defense.shielded = true,
            (EffectKind::RapidReload, _) => self.ammo.reload_mult = RAPID_RELOAD_MULT,
            (EffectKind::Invisibility, _) => self.visibility.invisible = true,
            (EffectKind::ReverseControls, _) => self.mobility.reversed = true,
            (EffectKind::Root, _) => self.mobility.rooted = true,
            (EffectKind::Stun, _) => self.mobility.stunned = true,
            (EffectKind::Possessed, EffectPayload::Drift { rad_per_frame }) => {
                self.mobility.possessed = true;
                self.mobility.possession_drift = rad_per_frame;
            }
            (EffectKind::Possessed, _) => self.mobility.possessed = true,
            (EffectKind::Chill, EffectPayload::Slow { factor }) => {
                self.mobility.chill_factor = factor
            }
            (EffectKind::HazardSlow, EffectPayload::Slow { factor }) => {
                self.mobility.hazard_factor = factor
            }
            (EffectKind::Blessing(buff), EffectPayload::Blessing { stacks }) => {
                self.blessing_stacks(buff, stacks as i64)
            }
            _ => {}
        }
    }

    fn on_end(&mut self, kind: EffectKind, payload: &EffectPayload) {
        if self.set_trait(kind, false) {
            return;
        }
        match (kind, *payload) {
            (EffectKind::SpeedBoost, _) => self.mobility.speed_mult = 1.0,
            (EffectKind::Shrink, _) => {
                self.collider.shrink_scale = 1.0;
                self.collider.refresh();
            }
            (EffectKind::Giant, _) => {
                self.collider.giant_scale = 1.0;
                self.collider.refresh();
            }
            (EffectKind::Shield, _) => self.defense.shielded = false,
            (EffectKind::RapidReload, _) => self.ammo.reload_mult = 1.0,
            (EffectKind::Invisibility, _) => self.visibility.invisible = false,
            (EffectKind::ReverseControls, _) => self.mobility.reversed = false,
            (EffectKind::Root, _) => self.mobility.rooted = false,
            (EffectKind::Stun, _) => self.mobility.stunned = false,
            (EffectKind::Possessed, _) => {
                self.mobility.possessed = false;
                self.mobility.possession_drift = 0.0;
            }
            (EffectKind::Chill, _) => self.mobility.chill_factor = 1.0,
            (EffectKind::HazardSlow, _) => self.mobility.hazard_factor = 1.0,
            (EffectKind::Blessing(buff), EffectPayload::Blessing { stacks }) => {
                self.blessing_stacks(buff, -(stacks as i64))
            }
            _ => {}
        }
    }

    fn on_update(&mut self, kind: EffectKind, payload: &mut EffectPayload, dt_secs: f32) {
        match (kind, *payload) {
            (EffectKind::HealOverTime, EffectPayload::Regen { hp_per_sec }) => {
                self.healed += self.health.heal(hp_per_sec * dt_secs);
            }
            (EffectKind::Poisoned, EffectPayload::Stacks { dps, .. })
            | (EffectKind::Burn, EffectPayload::Dot { dps }) => {
                self.pending_dot += dps * dt_secs;
            }
            (EffectKind::Blessing(BossBuff::MicroShield), _) => {
                let max = self.buffs.micro_shield_max();
                self.buffs.micro_shield_hp =
                    (self.buffs.micro_shield_hp + MICRO_SHIELD_REGEN * dt_secs).min(max);
            }
            _ => {}
        }
    }
}
