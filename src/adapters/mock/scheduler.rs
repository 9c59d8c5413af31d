//! Virtual-clock scheduler and fixed jitter for deterministic tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::traits::{JitterSource, Scheduler, TimerId};

#[derive(Debug, Default)]
struct ManualClock {
    now: Duration,
    next_id: u64,
    /// Pending timers and their deadlines
    timers: BTreeMap<TimerId, Duration>,
    /// Every delay ever scheduled, in order
    history: Vec<Duration>,
}

/// Scheduler driven by [`advance`](ManualScheduler::advance) instead of wall time.
///
/// Clones share the same clock.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    clock: Arc<Mutex<ManualClock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_clock<R>(&self, f: impl FnOnce(&mut ManualClock) -> R) -> R {
        let mut guard = self.clock.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Move the clock forward and return the timers that came due, earliest first.
    /// Returned timers are removed from the pending set.
    pub fn advance(&self, by: Duration) -> Vec<TimerId> {
        self.with_clock(|clock| {
            clock.now += by;
            let now = clock.now;
            let mut due: Vec<(Duration, TimerId)> = clock
                .timers
                .iter()
                .filter(|(_, deadline)| **deadline <= now)
                .map(|(id, deadline)| (*deadline, *id))
                .collect();
            due.sort();
            for (_, id) in &due {
                clock.timers.remove(id);
            }
            due.into_iter().map(|(_, id)| id).collect()
        })
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.with_clock(|clock| clock.now)
    }

    /// Number of timers scheduled and not yet fired or cancelled.
    pub fn pending_count(&self) -> usize {
        self.with_clock(|clock| clock.timers.len())
    }

    /// Every delay passed to `schedule`, in order.
    pub fn scheduled_delays(&self) -> Vec<Duration> {
        self.with_clock(|clock| clock.history.clone())
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        self.with_clock(|clock| {
            clock.next_id += 1;
            let id = TimerId(clock.next_id);
            let deadline = clock.now + delay;
            clock.timers.insert(id, deadline);
            clock.history.push(delay);
            id
        })
    }

    fn cancel(&mut self, id: TimerId) {
        self.with_clock(|clock| {
            clock.timers.remove(&id);
        });
    }
}

/// Jitter source that always returns the same factor.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl Default for FixedJitter {
    fn default() -> Self {
        Self(crate::traits::JITTER_MIN)
    }
}

impl JitterSource for FixedJitter {
    fn factor(&mut self) -> f64 {
        self.0
    }
}
