//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`Transport`] / [`Socket`] - socket creation and writes
//! - [`Scheduler`] - reconnect timers
//! - [`JitterSource`] - random factor for reconnect jitter
//! - [`Highlighter`] - syntax highlighting used by renderers
//!
//! Production implementations live in [`crate::adapters`]; deterministic
//! doubles live in [`crate::adapters::mock`].

pub mod highlight;
pub mod jitter;
pub mod scheduler;
pub mod transport;

pub use highlight::Highlighter;
pub use jitter::{JitterSource, JITTER_MAX, JITTER_MIN};
pub use scheduler::{Scheduler, TimerId};
pub use transport::{Socket, SocketEvent, SocketEventKind, SocketId, Transport};
