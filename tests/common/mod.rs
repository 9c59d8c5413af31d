//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use devconsole::adapters::mock::{FixedJitter, ManualScheduler, MockTransport};
use devconsole::config::ConsoleConfig;
use devconsole::traits::{SocketEvent, SocketId};
use devconsole::websocket::{ChannelHooks, ConnectionChannel, ConnectionStatus, EventEnvelope};

/// A channel wired to mocks, with every hook recorded.
pub struct ChannelFixture {
    pub channel: ConnectionChannel,
    pub transport: MockTransport,
    pub scheduler: ManualScheduler,
    pub statuses: Arc<Mutex<Vec<ConnectionStatus>>>,
    pub events: Arc<Mutex<Vec<EventEnvelope>>>,
}

impl ChannelFixture {
    pub fn new(config: &ConsoleConfig) -> Self {
        let transport = MockTransport::new();
        let scheduler = ManualScheduler::new();
        let statuses = Arc::new(Mutex::new(Vec::new()));
        let events = Arc::new(Mutex::new(Vec::new()));

        let hooks = {
            let statuses = Arc::clone(&statuses);
            let events = Arc::clone(&events);
            ChannelHooks::new()
                .on_status_change(move |s| statuses.lock().unwrap().push(s))
                .on_event(move |e| events.lock().unwrap().push(e))
        };

        let channel = ConnectionChannel::new(
            config,
            Box::new(transport.clone()),
            Box::new(scheduler.clone()),
            Box::new(FixedJitter(0.2)),
            hooks,
        );

        Self {
            channel,
            transport,
            scheduler,
            statuses,
            events,
        }
    }

    pub fn socket(&self) -> SocketId {
        self.transport.last_socket().expect("a socket was opened")
    }

    pub fn open(&mut self) {
        let id = self.socket();
        self.channel.handle_socket_event(SocketEvent::opened(id));
    }

    pub fn receive(&mut self, text: &str) {
        let id = self.socket();
        self.channel.handle_socket_event(SocketEvent::text(id, text));
    }

    pub fn drop_connection(&mut self) {
        let id = self.socket();
        self.channel.handle_socket_event(SocketEvent::closed(id));
    }

    pub fn advance(&mut self, by: Duration) {
        for id in self.scheduler.advance(by) {
            self.channel.on_timer(id);
        }
    }

    /// Remove and return the envelopes recorded so far.
    pub fn take_events(&self) -> Vec<EventEnvelope> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub fn statuses(&self) -> Vec<ConnectionStatus> {
        self.statuses.lock().unwrap().clone()
    }
}
