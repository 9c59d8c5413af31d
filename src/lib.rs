//! devconsole - client core for a live debug console
//!
//! Connects to a backend over a WebSocket, ingests streamed telemetry
//! events and folds them into bounded per-panel state that can be rendered
//! to a full panel, an inline console or a compact toolbar.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod error;
pub mod panels;
pub mod traits;
pub mod websocket;
