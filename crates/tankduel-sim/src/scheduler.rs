//! Tick-driven deferred actions.
//!
//! Delayed boss damage and follow-up shots are queued with an absolute fire
//! time and a validity guard. The engine pops due events once per tick after
//! status ticking; an event whose guard no longer holds is dropped.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use glam::Vec2;
use hecs::Entity;

use tankduel_core::enums::BossPhase;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduledAction {
    /// Area damage at a telegraphed spot, evaluated against whoever stands
    /// there when it resolves.
    TelegraphStrike { pos: Vec2, radius: f32, damage: f32 },
    /// Remaining shots of an aimed volley.
    DelayedVolley { shots_left: u32, interval_ms: f64 },
}

/// Condition re-checked when an event comes due. Every event is also bound
/// to the round it was scheduled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventGuard {
    OwnerAlive,
    OwnerInPhase(BossPhase),
}

#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    pub fire_at_ms: f64,
    pub seq: u64,
    pub owner: Entity,
    pub round: u32,
    pub guard: EventGuard,
    pub action: ScheduledAction,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fire_at_ms
            .total_cmp(&other.fire_at_ms)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Min-queue ordered by `(fire_at_ms, seq)`.
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<ScheduledEvent>>,
    next_seq: u64,
}

impl Scheduler {
    pub fn schedule(
        &mut self,
        fire_at_ms: f64,
        owner: Entity,
        round: u32,
        guard: EventGuard,
        action: ScheduledAction,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(ScheduledEvent {
            fire_at_ms,
            seq,
            owner,
            round,
            guard,
            action,
        }));
    }

    /// Pop the earliest event if it is due at `now_ms`.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<ScheduledEvent> {
        match self.queue.peek() {
            Some(Reverse(ev)) if ev.fire_at_ms <= now_ms => self.queue.pop().map(|r| r.0),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
