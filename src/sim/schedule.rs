//! Deferred and periodic effects
//!
//! Pop animations, expiry, power-up lifetimes, freeze expiry and the spawner
//! cadence are all entries in one priority queue keyed by due time. The tick
//! drains everything that is due, so tests drive time by passing timestamps
//! instead of waiting on real timers.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

/// Points granted when a popping target is finally removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reward {
    /// Combo-scaled hit (1, or 2 above the combo threshold), then combo += 1
    Combo,
    /// Fixed points, combo untouched
    Flat(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledEventKind {
    /// Recurring: spawn one target
    SpawnTarget,
    /// Recurring: spawn one power-up
    SpawnPowerUp,
    /// Recurring: recompute the boss spawn rate from score
    RampBossRate,
    /// Remove a popping target and grant its reward
    PopTarget { id: u32, reward: Reward },
    /// Remove expired targets and deduct one life each
    RemoveExpired { ids: Vec<u32> },
    /// Drop an unclaimed power-up
    ExpirePowerUp { id: u32 },
    /// Give frozen targets fresh velocities
    EndFreeze,
}

impl ScheduledEventKind {
    /// Period for self-rescheduling kinds
    pub fn interval_ms(&self) -> Option<u64> {
        use crate::consts::*;
        match self {
            ScheduledEventKind::SpawnTarget => Some(TARGET_SPAWN_INTERVAL_MS),
            ScheduledEventKind::SpawnPowerUp => Some(POWERUP_SPAWN_INTERVAL_MS),
            ScheduledEventKind::RampBossRate => Some(BOSS_RAMP_INTERVAL_MS),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub due_ms: u64,
    /// Insertion order, breaks ties so same-time events fire FIFO
    pub seq: u64,
    pub kind: ScheduledEventKind,
}

// BinaryHeap is a max-heap; invert so the earliest (due, seq) is on top.
impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due_ms, other.seq).cmp(&(self.due_ms, self.seq))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventQueue {
    heap: BinaryHeap<ScheduledEvent>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: u64, kind: ScheduledEventKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(ScheduledEvent { due_ms, seq, kind });
    }

    /// Pop the earliest event if it is due at `now_ms`
    pub fn pop_due(&mut self, now_ms: u64) -> Option<ScheduledEvent> {
        if self.heap.peek()?.due_ms <= now_ms {
            self.heap.pop()
        } else {
            None
        }
    }

    pub fn peek_due(&self) -> Option<u64> {
        self.heap.peek().map(|e| e.due_ms)
    }

    /// Reschedule a recurring event after it fired at `due_ms`.
    ///
    /// Missed periods (host stalled past the next slot) collapse into a
    /// single firing one interval after `now_ms`.
    pub fn reschedule(&mut self, fired: &ScheduledEvent, now_ms: u64) {
        let Some(interval) = fired.kind.interval_ms() else {
            return;
        };
        let mut next = fired.due_ms + interval;
        if next <= now_ms {
            next = now_ms + interval;
        }
        self.schedule(next, fired.kind.clone());
    }

    pub fn contains(&self, pred: impl Fn(&ScheduledEventKind) -> bool) -> bool {
        self.heap.iter().any(|e| pred(&e.kind))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
