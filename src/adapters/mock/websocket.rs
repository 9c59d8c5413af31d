//! Mock socket transport for testing.
//!
//! Records every socket it opens, every frame written and every close, so a
//! test can drive a [`ConnectionChannel`](crate::websocket::ConnectionChannel)
//! with hand-made [`SocketEvent`](crate::traits::SocketEvent)s and check what
//! reached the wire.

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use crate::error::TransportError;
use crate::traits::{Socket, SocketId, Transport};

#[derive(Debug, Default)]
struct MockTransportState {
    next_id: u64,
    /// Opened sockets with the URL they were opened for
    opened: Vec<(SocketId, String)>,
    /// Text frames written, in order
    sent: Vec<(SocketId, String)>,
    /// Sockets closed by the channel
    closed: Vec<SocketId>,
    /// Whether `open` should fail
    fail_open: bool,
    /// Whether `send_text` should fail
    fail_send: bool,
}

/// Mock transport.
///
/// Clones share state: keep one clone in the test and hand another to the
/// channel.
///
/// # Example
///
/// ```ignore
/// let transport = MockTransport::new();
/// let mut channel = ConnectionChannel::new(&config, Box::new(transport.clone()), ...);
/// channel.connect();
/// let socket = transport.last_socket().unwrap();
/// channel.handle_socket_event(SocketEvent::opened(socket));
/// assert_eq!(transport.sent_commands().len(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockTransportState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MockTransportState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// URLs passed to `open`, in order.
    pub fn opened_urls(&self) -> Vec<String> {
        self.with_state(|s| s.opened.iter().map(|(_, url)| url.clone()).collect())
    }

    /// Number of successful `open` calls.
    pub fn open_count(&self) -> usize {
        self.with_state(|s| s.opened.len())
    }

    /// The most recently opened socket.
    pub fn last_socket(&self) -> Option<SocketId> {
        self.with_state(|s| s.opened.last().map(|(id, _)| *id))
    }

    /// Raw text frames written, in order.
    pub fn sent_frames(&self) -> Vec<String> {
        self.with_state(|s| s.sent.iter().map(|(_, text)| text.clone()).collect())
    }

    /// Text frames written, parsed as JSON.
    pub fn sent_commands(&self) -> Vec<Value> {
        self.sent_frames()
            .iter()
            .filter_map(|text| serde_json::from_str(text).ok())
            .collect()
    }

    /// Sockets the channel closed.
    pub fn closed_sockets(&self) -> Vec<SocketId> {
        self.with_state(|s| s.closed.clone())
    }

    /// Clear recorded frames.
    pub fn clear_sent(&self) {
        self.with_state(|s| s.sent.clear());
    }

    /// Configure whether `open` should fail.
    pub fn set_fail_open(&self, fail: bool) {
        self.with_state(|s| s.fail_open = fail);
    }

    /// Configure whether `send_text` should fail.
    pub fn set_fail_send(&self, fail: bool) {
        self.with_state(|s| s.fail_send = fail);
    }
}

impl Transport for MockTransport {
    fn open(&mut self, url: &str) -> Result<Box<dyn Socket>, TransportError> {
        let id = self.with_state(|s| {
            if s.fail_open {
                return Err(TransportError::ConnectionFailed(
                    "Mock open failure".to_string(),
                ));
            }
            s.next_id += 1;
            let id = SocketId(s.next_id);
            s.opened.push((id, url.to_string()));
            Ok(id)
        })?;

        Ok(Box::new(MockSocket {
            id,
            transport: self.clone(),
        }))
    }
}

/// Socket handed out by [`MockTransport`].
#[derive(Debug)]
pub struct MockSocket {
    id: SocketId,
    transport: MockTransport,
}

impl Socket for MockSocket {
    fn id(&self) -> SocketId {
        self.id
    }

    fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        let id = self.id;
        self.transport.with_state(|s| {
            if s.fail_send {
                return Err(TransportError::SendFailed("Mock send failure".to_string()));
            }
            if s.closed.contains(&id) {
                return Err(TransportError::Closed);
            }
            s.sent.push((id, text));
            Ok(())
        })
    }

    fn close(&mut self) {
        let id = self.id;
        self.transport.with_state(|s| {
            if !s.closed.contains(&id) {
                s.closed.push(id);
            }
        });
    }
}
