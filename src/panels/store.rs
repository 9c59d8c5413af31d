//! Per-session panel state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use super::definition::PanelDefinition;
use super::registry::PanelRegistry;
use super::state::PanelState;
use crate::websocket::EventEnvelope;

/// Envelope type that drops panel state.
pub const CLEAR_EVENT: &str = "clear";
/// Envelope type carrying full panel state keyed by snapshot key.
pub const SNAPSHOT_EVENT: &str = "snapshot";

/// What [`PanelStore::apply`] did with an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// A panel reducer ran.
    Updated(String),
    /// States were replaced from a snapshot.
    Snapshot(Vec<String>),
    /// States were dropped.
    Cleared(Vec<String>),
    /// No panel listens to this event type.
    Unrouted,
}

/// Accumulated state for each panel id, created lazily.
#[derive(Debug, Clone, Default)]
pub struct PanelStore {
    states: HashMap<String, PanelState>,
    updated_at: HashMap<String, DateTime<Utc>>,
}

impl PanelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one inbound envelope into the store.
    pub fn apply(&mut self, registry: &PanelRegistry, envelope: &EventEnvelope) -> Applied {
        match envelope.event_type.as_str() {
            CLEAR_EVENT => {
                let ids = envelope.panel_ids();
                if ids.is_empty() {
                    Applied::Cleared(self.clear_all())
                } else {
                    self.clear(&ids);
                    Applied::Cleared(ids)
                }
            }
            SNAPSHOT_EVENT => Applied::Snapshot(self.apply_snapshot(registry, envelope)),
            event_type => match registry.find_by_event_type(event_type) {
                Some(panel) => {
                    self.reduce(&panel, envelope);
                    Applied::Updated(panel.id.clone())
                }
                None => {
                    debug!(event = %event_type, "No panel for event type");
                    Applied::Unrouted
                }
            },
        }
    }

    /// Run `panel`'s reducer on its current state.
    pub fn reduce(&mut self, panel: &PanelDefinition, envelope: &EventEnvelope) {
        let current = self.states.remove(&panel.id);
        let next = panel.reduce(current, envelope);
        self.set(&panel.id, next);
    }

    fn apply_snapshot(&mut self, registry: &PanelRegistry, envelope: &EventEnvelope) -> Vec<String> {
        let Some(Value::Object(payload)) = envelope.field("panels") else {
            return Vec::new();
        };

        let mut replaced = Vec::new();
        for panel in registry.list() {
            let value = payload
                .get(panel.snapshot_key())
                .or_else(|| payload.get(&panel.id));
            match value {
                Some(Value::Null) => {
                    self.remove(&panel.id);
                    replaced.push(panel.id.clone());
                }
                Some(value) => {
                    self.set(&panel.id, panel.from_snapshot(value.clone()));
                    replaced.push(panel.id.clone());
                }
                None => {}
            }
        }
        replaced
    }

    pub fn set(&mut self, panel_id: &str, state: PanelState) {
        self.states.insert(panel_id.to_string(), state);
        self.updated_at.insert(panel_id.to_string(), Utc::now());
    }

    pub fn get(&self, panel_id: &str) -> Option<&PanelState> {
        self.states.get(panel_id)
    }

    /// Display count for `panel`, 0 when it holds no state.
    pub fn count(&self, panel: &PanelDefinition) -> usize {
        panel.count(self.get(&panel.id))
    }

    pub fn last_updated(&self, panel_id: &str) -> Option<DateTime<Utc>> {
        self.updated_at.get(panel_id).copied()
    }

    pub fn remove(&mut self, panel_id: &str) -> Option<PanelState> {
        self.updated_at.remove(panel_id);
        self.states.remove(panel_id)
    }

    pub fn clear<S: AsRef<str>>(&mut self, panel_ids: &[S]) {
        for id in panel_ids {
            self.remove(id.as_ref());
        }
    }

    /// Drop everything. Returns the ids that held state.
    pub fn clear_all(&mut self) -> Vec<String> {
        let mut ids: Vec<String> = self.states.keys().cloned().collect();
        ids.sort();
        self.states.clear();
        self.updated_at.clear();
        ids
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// `(id, count)` for every toolbar panel, in registry order.
    pub fn toolbar_counts(&self, registry: &PanelRegistry) -> Vec<(String, usize)> {
        registry
            .toolbar_panels()
            .iter()
            .map(|panel| (panel.id.clone(), self.count(panel)))
            .collect()
    }
}
