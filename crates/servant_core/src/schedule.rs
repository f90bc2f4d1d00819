//! # Tick Scheduler
//!
//! One-shot deferred actions keyed by elapsed simulation ticks.
//!
//! ## Design
//!
//! - Tasks are plain data; the scheduler never runs code itself. The owner
//!   calls [`TickScheduler::advance`] once per tick and executes whatever
//!   comes back, so a task can only act on state looked up at fire time.
//! - No cancellation: a scheduled task always comes back exactly once.
//! - Tasks due on the same tick come back in scheduling order.

use std::collections::BTreeMap;

/// Absolute tick number on the scheduler's clock.
pub type Tick = u64;

/// A duration measured in ticks.
pub type Ticks = u64;

/// Tick-keyed queue of one-shot tasks.
#[derive(Debug)]
pub struct TickScheduler<T> {
    /// Ticks elapsed since creation.
    now: Tick,
    /// Scheduling sequence, breaks ties between tasks due on the same tick.
    next_seq: u64,
    /// Pending tasks ordered by (due tick, sequence).
    pending: BTreeMap<(Tick, u64), T>,
}

impl<T> TickScheduler<T> {
    /// Creates an empty scheduler at tick zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: 0,
            next_seq: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Current tick.
    #[inline]
    #[must_use]
    pub const fn now(&self) -> Tick {
        self.now
    }

    /// Number of tasks that have not fired yet.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if nothing is scheduled.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Schedules `task` to fire `delay` ticks from now.
    ///
    /// A zero delay fires on the next [`advance`](Self::advance).
    /// Returns the absolute tick the task is due on.
    pub fn schedule(&mut self, delay: Ticks, task: T) -> Tick {
        let due = self.now.saturating_add(delay.max(1));
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert((due, seq), task);
        due
    }

    /// Moves the clock forward one tick and takes every task now due.
    pub fn advance(&mut self) -> Vec<T> {
        self.now += 1;
        let later = self.pending.split_off(&(self.now + 1, 0));
        let due = std::mem::replace(&mut self.pending, later);
        due.into_values().collect()
    }

    /// Iterates pending tasks with their due tick, earliest first.
    pub fn iter(&self) -> impl Iterator<Item = (Tick, &T)> {
        self.pending.iter().map(|(&(due, _), task)| (due, task))
    }
}

impl<T> Default for TickScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
