//! Tokio-clock scheduler used by the async driver.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::traits::{Scheduler, TimerId};

#[derive(Debug, Default)]
struct TimerQueueState {
    next_id: u64,
    deadlines: BTreeMap<TimerId, Instant>,
}

/// Deadline table shared between a channel (which schedules) and the
/// driver loop (which sleeps until the next deadline and reports firings).
///
/// Deadlines use [`tokio::time::Instant`] so paused-clock tests work.
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    state: Arc<Mutex<TimerQueueState>>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut TimerQueueState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.with_state(|s| s.deadlines.values().min().copied())
    }

    /// Remove and return every timer due at `now`, earliest first.
    pub fn take_due(&self, now: Instant) -> Vec<TimerId> {
        self.with_state(|s| {
            let mut due: Vec<(Instant, TimerId)> = s
                .deadlines
                .iter()
                .filter(|(_, deadline)| **deadline <= now)
                .map(|(id, deadline)| (*deadline, *id))
                .collect();
            due.sort();
            for (_, id) in &due {
                s.deadlines.remove(id);
            }
            due.into_iter().map(|(_, id)| id).collect()
        })
    }

    pub fn len(&self) -> usize {
        self.with_state(|s| s.deadlines.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        let deadline = Instant::now() + delay;
        self.with_state(|s| {
            s.next_id += 1;
            let id = TimerId(s.next_id);
            s.deadlines.insert(id, deadline);
            id
        })
    }

    fn cancel(&mut self, id: TimerId) {
        self.with_state(|s| {
            s.deadlines.remove(&id);
        });
    }
}
