//! Socket transport abstraction.
//!
//! The channel core never touches a network library directly. It asks a
//! [`Transport`] to open a socket for a URL and gets back a [`Socket`] handle
//! it can write to and close. Everything the socket observes (open, frames,
//! errors, close) is fed back into the channel by its owner as
//! [`SocketEvent`]s tagged with the socket's [`SocketId`].

use std::fmt;

use crate::error::TransportError;
use crate::websocket::messages::Frame;

/// Identity of one opened socket. Ids are never reused by a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SocketId(pub u64);

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "socket#{}", self.0)
    }
}

/// Something a socket observed.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEventKind {
    /// The handshake completed.
    Opened,
    /// A frame arrived.
    Frame(Frame),
    /// The socket failed. A `Closed` event follows.
    Error(TransportError),
    /// The socket is gone, for whatever reason.
    Closed,
}

/// A [`SocketEventKind`] tagged with the socket that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketEvent {
    pub socket: SocketId,
    pub kind: SocketEventKind,
}

impl SocketEvent {
    pub fn new(socket: SocketId, kind: SocketEventKind) -> Self {
        Self { socket, kind }
    }

    pub fn opened(socket: SocketId) -> Self {
        Self::new(socket, SocketEventKind::Opened)
    }

    pub fn text(socket: SocketId, text: impl Into<String>) -> Self {
        Self::new(socket, SocketEventKind::Frame(Frame::Text(text.into())))
    }

    pub fn binary(socket: SocketId, data: Vec<u8>) -> Self {
        Self::new(socket, SocketEventKind::Frame(Frame::Binary(data)))
    }

    pub fn error(socket: SocketId, error: TransportError) -> Self {
        Self::new(socket, SocketEventKind::Error(error))
    }

    pub fn closed(socket: SocketId) -> Self {
        Self::new(socket, SocketEventKind::Closed)
    }
}

/// Write half of an opened socket.
pub trait Socket: Send {
    /// The id this socket's events are tagged with.
    fn id(&self) -> SocketId;

    /// Queue a text frame for sending.
    fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Start closing the socket. A `Closed` event is still delivered afterwards.
    fn close(&mut self);
}

/// Factory for sockets.
///
/// `open` returns as soon as the attempt has started; completion is reported
/// through an `Opened` (or `Error` + `Closed`) event for the returned id.
pub trait Transport: Send {
    fn open(&mut self, url: &str) -> Result<Box<dyn Socket>, TransportError>;
}
