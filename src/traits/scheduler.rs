//! Timer scheduling abstraction.
//!
//! The channel schedules at most one reconnect timer at a time. The owner of
//! the scheduler reports a fired timer back with
//! [`ConnectionChannel::on_timer`](crate::websocket::ConnectionChannel::on_timer).

use std::time::Duration;

/// Identity of a scheduled timer. Ids are never reused by a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

pub trait Scheduler: Send {
    /// Arrange for `id` to fire after `delay`.
    fn schedule(&mut self, delay: Duration) -> TimerId;

    /// Cancel a timer. Cancelling an unknown or already-fired timer is a no-op.
    fn cancel(&mut self, id: TimerId);
}
