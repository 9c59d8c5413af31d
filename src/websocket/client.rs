use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::messages::{Command, EventEnvelope};
use super::reconnect::ReconnectPolicy;
use crate::config::ConsoleConfig;
use crate::error::TransportError;
use crate::traits::{
    JitterSource, Scheduler, Socket, SocketEvent, SocketEventKind, SocketId, TimerId, Transport,
};

/// Connection status of a [`ConnectionChannel`].
///
/// Only the channel moves between states; owners observe them through
/// [`ChannelHooks::on_status_change`] or [`ConnectionChannel::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Error,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Reconnecting => "reconnecting",
            ConnectionStatus::Error => "error",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type EventHook = Box<dyn FnMut(EventEnvelope) + Send>;
type StatusHook = Box<dyn FnMut(ConnectionStatus) + Send>;
type ErrorHook = Box<dyn FnMut(TransportError) + Send>;

/// Callbacks invoked by the channel. All are optional.
#[derive(Default)]
pub struct ChannelHooks {
    on_event: Option<EventHook>,
    on_status_change: Option<StatusHook>,
    on_error: Option<ErrorHook>,
}

impl ChannelHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per inbound text frame that decodes to an envelope.
    pub fn on_event(mut self, f: impl FnMut(EventEnvelope) + Send + 'static) -> Self {
        self.on_event = Some(Box::new(f));
        self
    }

    /// Called once per actual status change. Repeated statuses are coalesced.
    pub fn on_status_change(mut self, f: impl FnMut(ConnectionStatus) + Send + 'static) -> Self {
        self.on_status_change = Some(Box::new(f));
        self
    }

    /// Called on socket errors, before the status becomes `Error`.
    pub fn on_error(mut self, f: impl FnMut(TransportError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for ChannelHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelHooks")
            .field("on_event", &self.on_event.is_some())
            .field("on_status_change", &self.on_status_change.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Socket connection manager with reconnection and command queuing.
///
/// The channel is a synchronous state machine. Whoever owns it feeds back
/// what the socket observed ([`handle_socket_event`](Self::handle_socket_event))
/// and which timers fired ([`on_timer`](Self::on_timer)); the channel reacts by
/// opening sockets, writing frames and scheduling timers through its injected
/// [`Transport`], [`Scheduler`] and [`JitterSource`].
pub struct ConnectionChannel {
    url: String,
    policy: ReconnectPolicy,
    transport: Box<dyn Transport>,
    scheduler: Box<dyn Scheduler>,
    jitter: Box<dyn JitterSource>,
    hooks: ChannelHooks,
    socket: Option<Box<dyn Socket>>,
    status: ConnectionStatus,
    /// Commands issued while not connected, flushed FIFO on open
    pending: Vec<Command>,
    /// Reconnects scheduled since the last successful open
    attempts: u32,
    manual_close: bool,
    reconnect_timer: Option<TimerId>,
}

impl ConnectionChannel {
    pub fn new(
        config: &ConsoleConfig,
        transport: Box<dyn Transport>,
        scheduler: Box<dyn Scheduler>,
        jitter: Box<dyn JitterSource>,
        hooks: ChannelHooks,
    ) -> Self {
        Self {
            url: config.ws_url(),
            policy: config.reconnect_policy(),
            transport,
            scheduler,
            jitter,
            hooks,
            socket: None,
            status: ConnectionStatus::Disconnected,
            pending: Vec::new(),
            attempts: 0,
            manual_close: false,
            reconnect_timer: None,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    /// Reconnects scheduled since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Commands waiting for the next open.
    pub fn pending_commands(&self) -> &[Command] {
        &self.pending
    }

    /// Id of the socket the channel currently listens to.
    pub fn socket_id(&self) -> Option<SocketId> {
        self.socket.as_ref().map(|s| s.id())
    }

    pub fn has_pending_reconnect(&self) -> bool {
        self.reconnect_timer.is_some()
    }

    /// Open a socket. No-op while connecting or connected.
    ///
    /// Resets the attempt counter, clears the manual-close flag and cancels
    /// any scheduled reconnect.
    pub fn connect(&mut self) {
        if matches!(
            self.status,
            ConnectionStatus::Connecting | ConnectionStatus::Connected
        ) {
            debug!(status = %self.status, "connect() ignored");
            return;
        }

        self.manual_close = false;
        self.attempts = 0;
        self.cancel_reconnect();
        self.open_socket();
    }

    /// Close the socket and stop reconnecting.
    ///
    /// The reconnect timer is cancelled and forgotten before returning, so a
    /// late firing of it is ignored by [`on_timer`](Self::on_timer).
    pub fn close(&mut self) {
        self.manual_close = true;
        self.cancel_reconnect();
        if let Some(mut socket) = self.socket.take() {
            info!(socket = %socket.id(), "Closing debug console socket");
            socket.close();
        }
        self.set_status(ConnectionStatus::Disconnected);
    }

    /// Send a command now if connected, otherwise queue it for the next open.
    /// Commands without a `type` are ignored.
    pub fn send_command(&mut self, command: Command) {
        if !command.is_valid() {
            return;
        }

        if self.status != ConnectionStatus::Connected {
            self.pending.push(command);
            return;
        }

        let Some(socket) = self.socket.as_mut() else {
            self.pending.push(command);
            return;
        };

        match serde_json::to_string(&command) {
            Ok(text) => {
                debug!(command = %command.command_type, "Sending command");
                if let Err(e) = socket.send_text(text) {
                    warn!(
                        command = %command.command_type,
                        code = e.error_code(),
                        "Failed to send command: {}",
                        e
                    );
                }
            }
            Err(e) => {
                warn!(command = %command.command_type, "Failed to serialize command: {}", e);
            }
        }
    }

    pub fn subscribe<S: AsRef<str>>(&mut self, panels: &[S]) {
        self.send_command(Command::subscribe(panels));
    }

    pub fn unsubscribe<S: AsRef<str>>(&mut self, panels: &[S]) {
        self.send_command(Command::unsubscribe(panels));
    }

    pub fn request_snapshot(&mut self) {
        self.send_command(Command::snapshot());
    }

    pub fn clear<S: AsRef<str>>(&mut self, panels: &[S]) {
        self.send_command(Command::clear(panels));
    }

    /// Feed back something the transport observed.
    /// Events from sockets other than the current one are ignored.
    pub fn handle_socket_event(&mut self, event: SocketEvent) {
        if self.socket_id() != Some(event.socket) {
            debug!(socket = %event.socket, "Ignoring event from stale socket");
            return;
        }

        match event.kind {
            SocketEventKind::Opened => self.handle_open(),
            SocketEventKind::Frame(frame) => {
                if let Some(envelope) = EventEnvelope::from_frame(&frame) {
                    if let Some(hook) = self.hooks.on_event.as_mut() {
                        hook(envelope);
                    }
                }
            }
            SocketEventKind::Error(error) => self.handle_error(error),
            SocketEventKind::Closed => {
                self.socket = None;
                self.handle_close();
            }
        }
    }

    /// Report a fired timer. Only the currently scheduled reconnect timer has
    /// any effect.
    pub fn on_timer(&mut self, id: TimerId) {
        if self.reconnect_timer != Some(id) {
            return;
        }
        self.reconnect_timer = None;

        if self.manual_close || self.status != ConnectionStatus::Reconnecting {
            return;
        }
        self.open_socket();
    }

    fn open_socket(&mut self) {
        if let Some(mut stale) = self.socket.take() {
            stale.close();
        }

        self.set_status(ConnectionStatus::Connecting);
        match self.transport.open(&self.url) {
            Ok(socket) => {
                info!(url = %self.url, socket = %socket.id(), "Connecting to debug console");
                self.socket = Some(socket);
            }
            Err(e) => {
                warn!(url = %self.url, code = e.error_code(), "Failed to open socket: {}", e);
                self.handle_error(e);
                self.handle_close();
            }
        }
    }

    fn handle_open(&mut self) {
        info!(url = %self.url, "Debug console connected");
        self.attempts = 0;
        self.set_status(ConnectionStatus::Connected);

        let queued = std::mem::take(&mut self.pending);
        if !queued.is_empty() {
            debug!(count = queued.len(), "Flushing queued commands");
        }
        for command in queued {
            self.send_command(command);
        }
    }

    fn handle_error(&mut self, error: TransportError) {
        warn!(code = error.error_code(), "Debug console socket error: {}", error);
        if let Some(hook) = self.hooks.on_error.as_mut() {
            hook(error);
        }
        self.set_status(ConnectionStatus::Error);
    }

    fn handle_close(&mut self) {
        if self.manual_close {
            self.set_status(ConnectionStatus::Disconnected);
            return;
        }
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&mut self) {
        if !self.policy.allows(self.attempts) {
            warn!(
                attempts = self.attempts,
                "Giving up on debug console after {} reconnect attempts", self.attempts
            );
            self.cancel_reconnect();
            self.set_status(ConnectionStatus::Disconnected);
            return;
        }

        let delay = self.policy.delay_for(self.attempts, self.jitter.factor());
        self.attempts += 1;
        self.set_status(ConnectionStatus::Reconnecting);
        self.cancel_reconnect();
        self.reconnect_timer = Some(self.scheduler.schedule(delay));
        info!(
            attempt = self.attempts,
            max_attempts = self.policy.max_attempts,
            delay_ms = delay.as_millis() as u64,
            "Scheduling reconnect"
        );
    }

    fn cancel_reconnect(&mut self) {
        if let Some(id) = self.reconnect_timer.take() {
            self.scheduler.cancel(id);
        }
    }

    fn set_status(&mut self, status: ConnectionStatus) {
        if self.status == status {
            return;
        }
        debug!(from = %self.status, to = %status, "Connection status changed");
        self.status = status;
        if let Some(hook) = self.hooks.on_status_change.as_mut() {
            hook(status);
        }
    }
}

impl fmt::Debug for ConnectionChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionChannel")
            .field("url", &self.url)
            .field("status", &self.status)
            .field("attempts", &self.attempts)
            .field("pending", &self.pending.len())
            .field("socket", &self.socket_id())
            .field("reconnect_timer", &self.reconnect_timer)
            .finish()
    }
}
