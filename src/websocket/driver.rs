//! Tokio driver for a [`ConnectionChannel`].
//!
//! [`ConsoleClient`] spawns one task that owns the channel and multiplexes
//! socket events, timer deadlines and commands from the client handle. The
//! channel itself stays synchronous; this is the only place that awaits.

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::client::{ChannelHooks, ConnectionChannel, ConnectionStatus};
use super::messages::{Command, EventEnvelope};
use crate::adapters::{RandomJitter, TimerQueue, TungsteniteTransport};
use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, ConsoleResult, TransportError};
use crate::traits::{JitterSource, SocketEvent, Transport};

const ERROR_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug)]
enum DriverCommand {
    Connect,
    Close,
    Send(Command),
    Shutdown,
}

/// Handle to a running console connection.
pub struct ConsoleClient {
    /// Commands for the driver task
    command_tx: mpsc::UnboundedSender<DriverCommand>,
    /// Parsed inbound envelopes
    event_rx: mpsc::Receiver<EventEnvelope>,
    /// Current connection status
    status_rx: watch::Receiver<ConnectionStatus>,
    /// Transport errors, for anyone who cares
    error_tx: broadcast::Sender<TransportError>,
    task: Option<JoinHandle<()>>,
}

impl ConsoleClient {
    /// Spawn a driver over tokio-tungstenite sockets. Does not connect yet.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: &ConsoleConfig) -> Self {
        let (transport, socket_events) = TungsteniteTransport::new();
        Self::spawn_with(
            config,
            Box::new(transport),
            socket_events,
            Box::new(RandomJitter::new()),
        )
    }

    /// Spawn a driver over an arbitrary transport whose sockets report to
    /// `socket_events`.
    pub fn spawn_with(
        config: &ConsoleConfig,
        transport: Box<dyn Transport>,
        socket_events: mpsc::UnboundedReceiver<SocketEvent>,
        jitter: Box<dyn JitterSource>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(config.channel_capacity.max(1));
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Disconnected);
        let (error_tx, _) = broadcast::channel(ERROR_CHANNEL_CAPACITY);

        let hooks = {
            let error_tx = error_tx.clone();
            ChannelHooks::new()
                .on_event(move |envelope| forward_event(&event_tx, envelope))
                .on_status_change(move |status| {
                    status_tx.send_replace(status);
                })
                .on_error(move |error| {
                    // No subscribers is fine
                    let _ = error_tx.send(error);
                })
        };

        let timers = TimerQueue::new();
        let channel = ConnectionChannel::new(
            config,
            transport,
            Box::new(timers.clone()),
            jitter,
            hooks,
        );

        let task = tokio::spawn(run_driver(channel, timers, socket_events, command_rx));

        Self {
            command_tx,
            event_rx,
            status_rx,
            error_tx,
            task: Some(task),
        }
    }

    /// Get the current connection status.
    pub fn status(&self) -> ConnectionStatus {
        *self.status_rx.borrow()
    }

    /// Check if currently connected.
    pub fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected
    }

    /// Subscribe to status changes.
    pub fn status_receiver(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }

    /// Subscribe to transport errors.
    pub fn errors(&self) -> broadcast::Receiver<TransportError> {
        self.error_tx.subscribe()
    }

    pub fn connect(&self) -> ConsoleResult<()> {
        self.dispatch(DriverCommand::Connect)
    }

    pub fn close(&self) -> ConsoleResult<()> {
        self.dispatch(DriverCommand::Close)
    }

    pub fn send_command(&self, command: Command) -> ConsoleResult<()> {
        self.dispatch(DriverCommand::Send(command))
    }

    pub fn subscribe<S: AsRef<str>>(&self, panels: &[S]) -> ConsoleResult<()> {
        self.send_command(Command::subscribe(panels))
    }

    pub fn unsubscribe<S: AsRef<str>>(&self, panels: &[S]) -> ConsoleResult<()> {
        self.send_command(Command::unsubscribe(panels))
    }

    pub fn request_snapshot(&self) -> ConsoleResult<()> {
        self.send_command(Command::snapshot())
    }

    pub fn clear<S: AsRef<str>>(&self, panels: &[S]) -> ConsoleResult<()> {
        self.send_command(Command::clear(panels))
    }

    /// Subscribe to `panels` and request a snapshot.
    ///
    /// Call while not connected: both commands wait in the pending queue and
    /// go out first on the next open, so no open is missed between a status
    /// change and the caller reacting to it.
    pub fn resync<S: AsRef<str>>(&self, panels: &[S]) -> ConsoleResult<()> {
        self.subscribe(panels)?;
        self.request_snapshot()
    }

    /// Receive the next inbound envelope.
    pub async fn recv(&mut self) -> Option<EventEnvelope> {
        self.event_rx.recv().await
    }

    /// Get a reference to the envelope receiver for use with select!
    pub fn event_receiver(&mut self) -> &mut mpsc::Receiver<EventEnvelope> {
        &mut self.event_rx
    }

    /// Close the connection and stop the driver task.
    pub fn shutdown(&self) {
        info!("Shutting down debug console client");
        let _ = self.command_tx.send(DriverCommand::Shutdown);
    }

    /// Shut down and wait for the driver task to finish.
    pub async fn join(mut self) {
        self.shutdown();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Console driver task failed: {}", e);
            }
        }
    }

    fn dispatch(&self, command: DriverCommand) -> ConsoleResult<()> {
        self.command_tx
            .send(command)
            .map_err(|_| ConsoleError::DriverStopped)
    }
}

impl Drop for ConsoleClient {
    fn drop(&mut self) {
        let _ = self.command_tx.send(DriverCommand::Shutdown);
    }
}

fn forward_event(event_tx: &mpsc::Sender<EventEnvelope>, envelope: EventEnvelope) {
    match event_tx.try_send(envelope) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(dropped)) => {
            warn!(event = %dropped.event_type, "Event queue full, dropping event");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {}
    }
}

async fn run_driver(
    mut channel: ConnectionChannel,
    timers: TimerQueue,
    mut socket_events: mpsc::UnboundedReceiver<SocketEvent>,
    mut commands: mpsc::UnboundedReceiver<DriverCommand>,
) {
    loop {
        let next_deadline = timers.next_deadline();

        tokio::select! {
            event = socket_events.recv() => {
                match event {
                    Some(event) => channel.handle_socket_event(event),
                    None => {
                        debug!("Transport event channel closed, stopping driver");
                        break;
                    }
                }
            }
            command = commands.recv() => {
                match command {
                    Some(DriverCommand::Connect) => channel.connect(),
                    Some(DriverCommand::Close) => channel.close(),
                    Some(DriverCommand::Send(command)) => channel.send_command(command),
                    Some(DriverCommand::Shutdown) | None => {
                        channel.close();
                        break;
                    }
                }
            }
            _ = sleep_until(next_deadline) => {
                for id in timers.take_due(Instant::now()) {
                    channel.on_timer(id);
                }
            }
        }
    }

    info!("Console driver stopped");
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{FixedJitter, MockTransport};
    use std::time::Duration;

    async fn wait_for_status(client: &ConsoleClient, target: ConnectionStatus) {
        let mut rx = client.status_receiver();
        tokio::time::timeout(Duration::from_secs(5), async {
            while *rx.borrow_and_update() != target {
                if rx.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
        .expect("status reached in time");
    }

    async fn wait_for_open_count(transport: &MockTransport, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while transport.open_count() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("socket opened in time");
    }

    #[tokio::test]
    async fn test_driver_routes_events_and_flushes_commands() {
        let transport = MockTransport::new();
        let (socket_tx, socket_rx) = mpsc::unbounded_channel();
        let mut client = ConsoleClient::spawn_with(
            &ConsoleConfig::default(),
            Box::new(transport.clone()),
            socket_rx,
            Box::new(FixedJitter(0.2)),
        );

        client.subscribe(&["requests"]).unwrap();
        client.connect().unwrap();
        wait_for_open_count(&transport, 1).await;
        let id = transport.last_socket().unwrap();

        socket_tx.send(SocketEvent::opened(id)).unwrap();
        wait_for_status(&client, ConnectionStatus::Connected).await;
        assert_eq!(transport.sent_commands()[0]["type"], "subscribe");

        socket_tx
            .send(SocketEvent::text(id, r#"{"type":"sql","sql":"SELECT 1"}"#))
            .unwrap();
        let envelope = client.recv().await.unwrap();
        assert_eq!(envelope.event_type, "sql");

        client.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_reconnects_after_timer() {
        let transport = MockTransport::new();
        let (socket_tx, socket_rx) = mpsc::unbounded_channel();
        let client = ConsoleClient::spawn_with(
            &ConsoleConfig::default(),
            Box::new(transport.clone()),
            socket_rx,
            Box::new(FixedJitter(0.2)),
        );

        client.connect().unwrap();
        wait_for_open_count(&transport, 1).await;
        let id = transport.last_socket().unwrap();
        socket_tx.send(SocketEvent::opened(id)).unwrap();
        wait_for_status(&client, ConnectionStatus::Connected).await;

        socket_tx.send(SocketEvent::closed(id)).unwrap();
        wait_for_status(&client, ConnectionStatus::Reconnecting).await;

        // Paused clock auto-advances to the 1.2s deadline.
        wait_for_open_count(&transport, 2).await;
        assert_eq!(client.status(), ConnectionStatus::Connecting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resync_is_flushed_on_every_open() {
        let transport = MockTransport::new();
        let (socket_tx, socket_rx) = mpsc::unbounded_channel();
        let client = ConsoleClient::spawn_with(
            &ConsoleConfig::default(),
            Box::new(transport.clone()),
            socket_rx,
            Box::new(FixedJitter(0.2)),
        );

        client.resync(&["requests", "sql"]).unwrap();
        client.connect().unwrap();
        wait_for_open_count(&transport, 1).await;
        let first = transport.last_socket().unwrap();
        socket_tx.send(SocketEvent::opened(first)).unwrap();
        wait_for_status(&client, ConnectionStatus::Connected).await;

        let types: Vec<_> = transport.sent_commands().iter().map(|c| c["type"].clone()).collect();
        assert_eq!(types, vec!["subscribe", "snapshot"]);
        assert_eq!(transport.sent_commands()[0]["panels"], serde_json::json!(["requests", "sql"]));

        transport.clear_sent();
        socket_tx.send(SocketEvent::closed(first)).unwrap();
        wait_for_status(&client, ConnectionStatus::Reconnecting).await;
        client.resync(&["requests", "sql"]).unwrap();

        wait_for_open_count(&transport, 2).await;
        let second = transport.last_socket().unwrap();
        socket_tx.send(SocketEvent::opened(second)).unwrap();
        wait_for_status(&client, ConnectionStatus::Connected).await;

        let types: Vec<_> = transport.sent_commands().iter().map(|c| c["type"].clone()).collect();
        assert_eq!(types, vec!["subscribe", "snapshot"]);
    }

    #[tokio::test]
    async fn test_errors_are_broadcast() {
        let transport = MockTransport::new();
        transport.set_fail_open(true);
        let (_socket_tx, socket_rx) = mpsc::unbounded_channel();
        let client = ConsoleClient::spawn_with(
            &ConsoleConfig::default(),
            Box::new(transport),
            socket_rx,
            Box::new(FixedJitter(0.2)),
        );
        let mut errors = client.errors();

        client.connect().unwrap();
        let error = tokio::time::timeout(Duration::from_secs(5), errors.recv())
            .await
            .expect("error in time")
            .unwrap();
        assert!(matches!(error, TransportError::ConnectionFailed(_)));
    }

    #[tokio::test]
    async fn test_commands_fail_after_driver_stops() {
        let (_socket_tx, socket_rx) = mpsc::unbounded_channel();
        let client = ConsoleClient::spawn_with(
            &ConsoleConfig::default(),
            Box::new(MockTransport::new()),
            socket_rx,
            Box::new(FixedJitter(0.2)),
        );
        client.shutdown();

        tokio::time::timeout(Duration::from_secs(5), async {
            while client.request_snapshot().is_ok() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("driver stopped in time");
        assert!(matches!(
            client.request_snapshot(),
            Err(ConsoleError::DriverStopped)
        ));
    }
}
