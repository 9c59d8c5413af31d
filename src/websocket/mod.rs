//! Connection to the debug console endpoint.
//!
//! [`ConnectionChannel`] is a synchronous state machine that owns one socket
//! at a time, queues commands while offline and schedules jittered reconnects
//! through injected [`Scheduler`](crate::traits::Scheduler) and
//! [`JitterSource`](crate::traits::JitterSource) implementations.
//! [`ConsoleClient`] runs a channel on a tokio task.

pub mod client;
pub mod driver;
pub mod messages;
pub mod reconnect;

pub use client::{ChannelHooks, ConnectionChannel, ConnectionStatus};
pub use driver::ConsoleClient;
pub use messages::{Command, EventEnvelope, Frame};
pub use reconnect::ReconnectPolicy;
