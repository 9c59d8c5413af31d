//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockTransport`] - records opened sockets, written frames and closes
//! - [`ManualScheduler`] - virtual clock advanced by hand
//! - [`FixedJitter`] - constant jitter factor

pub mod scheduler;
pub mod websocket;

pub use scheduler::{FixedJitter, ManualScheduler};
pub use websocket::{MockSocket, MockTransport};
