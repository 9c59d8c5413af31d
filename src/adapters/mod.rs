//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`TungsteniteTransport`] - WebSocket sockets using tokio-tungstenite
//! - [`TimerQueue`] - reconnect timers on the tokio clock
//! - [`RandomJitter`] - jitter from a seedable RNG
//! - [`EscapingHighlighter`] - escape-only highlighter
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides deterministic doubles:
//! - [`mock::MockTransport`] - records sockets and frames
//! - [`mock::ManualScheduler`] - hand-advanced virtual clock
//! - [`mock::FixedJitter`] - constant jitter factor

pub mod highlight;
pub mod mock;
pub mod random_jitter;
pub mod timer_queue;
pub mod tungstenite_ws;

pub use highlight::EscapingHighlighter;
pub use mock::{FixedJitter, ManualScheduler, MockTransport};
pub use random_jitter::RandomJitter;
pub use timer_queue::TimerQueue;
pub use tungstenite_ws::TungsteniteTransport;
