//! Tungstenite-based socket transport.
//!
//! Every [`open`](Transport::open) spawns one tokio task that owns the
//! WebSocket stream. The task reports what it sees on a shared event channel
//! and takes outbound frames from a per-socket queue, so the channel core
//! never awaits anything.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::traits::{Socket, SocketEvent, SocketId, Transport};

enum Outbound {
    Text(String),
    Close,
}

/// Socket transport using tokio-tungstenite.
///
/// # Example
///
/// ```ignore
/// let (transport, mut socket_events) = TungsteniteTransport::new();
/// // hand `transport` to a ConnectionChannel, feed `socket_events` back into it
/// ```
pub struct TungsteniteTransport {
    events_tx: mpsc::UnboundedSender<SocketEvent>,
    next_id: u64,
}

impl TungsteniteTransport {
    /// Create a transport and the receiver all of its sockets report to.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SocketEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        (
            Self {
                events_tx,
                next_id: 0,
            },
            events_rx,
        )
    }
}

impl Transport for TungsteniteTransport {
    fn open(&mut self, url: &str) -> Result<Box<dyn Socket>, TransportError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        self.next_id += 1;
        let id = SocketId(self.next_id);
        let (out_tx, out_rx) = mpsc::unbounded_channel();

        runtime.spawn(run_socket(
            id,
            url.to_string(),
            out_rx,
            self.events_tx.clone(),
        ));

        Ok(Box::new(TungsteniteSocket { id, out_tx }))
    }
}

/// Write half handed to the channel.
struct TungsteniteSocket {
    id: SocketId,
    out_tx: mpsc::UnboundedSender<Outbound>,
}

impl Socket for TungsteniteSocket {
    fn id(&self) -> SocketId {
        self.id
    }

    fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.out_tx
            .send(Outbound::Text(text))
            .map_err(|_| TransportError::Closed)
    }

    fn close(&mut self) {
        let _ = self.out_tx.send(Outbound::Close);
    }
}

/// Own one WebSocket until it closes. Always ends with a `Closed` event.
async fn run_socket(
    id: SocketId,
    url: String,
    mut out_rx: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<SocketEvent>,
) {
    let ws_stream = match connect_async(url.as_str()).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            let _ = events.send(SocketEvent::error(
                id,
                TransportError::ConnectionFailed(e.to_string()),
            ));
            let _ = events.send(SocketEvent::closed(id));
            return;
        }
    };

    let _ = events.send(SocketEvent::opened(id));
    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    loop {
        tokio::select! {
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let _ = events.send(SocketEvent::text(id, text));
                    }
                    Some(Ok(Message::Binary(data))) => {
                        let _ = events.send(SocketEvent::binary(id, data));
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(socket = %id, "Server closed the socket");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Pong and raw frames carry nothing for us
                    }
                    Some(Err(e)) => {
                        let _ = events.send(SocketEvent::error(
                            id,
                            TransportError::Protocol(e.to_string()),
                        ));
                        break;
                    }
                }
            }
            outbound = out_rx.recv() => {
                match outbound {
                    Some(Outbound::Text(text)) => {
                        if let Err(e) = ws_sink.send(Message::Text(text)).await {
                            warn!(socket = %id, "Failed to write frame: {}", e);
                            let _ = events.send(SocketEvent::error(
                                id,
                                TransportError::SendFailed(e.to_string()),
                            ));
                            break;
                        }
                    }
                    Some(Outbound::Close) | None => {
                        let _ = ws_sink.close().await;
                        break;
                    }
                }
            }
        }
    }

    let _ = events.send(SocketEvent::closed(id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::SocketEventKind;

    #[test]
    fn test_open_outside_runtime_fails() {
        let (mut transport, _events) = TungsteniteTransport::new();
        let result = transport.open("ws://127.0.0.1:59999/ws");
        assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn test_connect_failure_reports_error_then_close() {
        let (mut transport, mut events) = TungsteniteTransport::new();
        let socket = transport.open("ws://127.0.0.1:59999/ws").unwrap();
        let id = socket.id();

        let first = events.recv().await.unwrap();
        assert_eq!(first.socket, id);
        assert!(matches!(
            first.kind,
            SocketEventKind::Error(TransportError::ConnectionFailed(_))
        ));

        let second = events.recv().await.unwrap();
        assert_eq!(second, SocketEvent::closed(id));
    }

    #[tokio::test]
    async fn test_socket_ids_are_unique() {
        let (mut transport, _events) = TungsteniteTransport::new();
        let a = transport.open("ws://127.0.0.1:59999/ws").unwrap();
        let b = transport.open("ws://127.0.0.1:59999/ws").unwrap();
        assert_ne!(a.id(), b.id());
    }
}
