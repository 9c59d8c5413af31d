//! Socket transport errors.

use thiserror::Error;

/// Errors raised by a [`Transport`](crate::traits::Transport) or one of its sockets.
///
/// The channel never propagates these to its owner. They are reported through
/// the `on_error` hook and followed by the normal reconnect path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The socket could not be opened.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A frame could not be written to the socket.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// The socket was already closed.
    #[error("Socket closed")]
    Closed,

    /// The peer violated the WebSocket protocol.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl TransportError {
    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            TransportError::ConnectionFailed(_) => "E_WS_CONN",
            TransportError::SendFailed(_) => "E_WS_SEND",
            TransportError::Closed => "E_WS_CLOSED",
            TransportError::Protocol(_) => "E_WS_PROTOCOL",
        }
    }
}
