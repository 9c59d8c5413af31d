//! Panel definitions: identity, event routing, reduction and renderers.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::render::{render_json, RenderContext};
use super::state::{append_bounded, count_of, merge_object, PanelState};
use crate::websocket::EventEnvelope;

/// Order assumed for panels that do not declare one.
pub const DEFAULT_ORDER: i32 = 100;

pub type EventHandler =
    Arc<dyn Fn(Option<PanelState>, &EventEnvelope) -> PanelState + Send + Sync>;
pub type CountFn = Arc<dyn Fn(Option<&PanelState>) -> usize + Send + Sync>;
pub type RenderFn = Arc<dyn Fn(Option<&PanelState>, &RenderContext) -> String + Send + Sync>;
pub type SnapshotFn = Arc<dyn Fn(Value) -> PanelState + Send + Sync>;

/// How an envelope is folded into a panel's state.
#[derive(Clone)]
pub enum Reducer {
    /// Ring buffer of whole envelopes. Capacity 0 is unbounded.
    Append { capacity: usize },
    /// The envelope becomes the new state.
    Replace,
    /// Shallow key union with the envelope's fields.
    Merge,
    /// Panel-supplied handler; its result replaces the state unconditionally.
    Custom(EventHandler),
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reducer::Append { capacity } => {
                f.debug_struct("Append").field("capacity", capacity).finish()
            }
            Reducer::Replace => f.write_str("Replace"),
            Reducer::Merge => f.write_str("Merge"),
            Reducer::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One telemetry kind as seen by the console.
#[derive(Clone)]
pub struct PanelDefinition {
    pub id: String,
    pub label: String,
    pub icon: String,
    pub category: String,
    pub order: Option<i32>,
    /// Empty means snapshot-only.
    pub event_types: Vec<String>,
    pub snapshot_key: Option<String>,
    pub supports_toolbar: bool,
    pub reducer: Reducer,
    /// Builds state from a snapshot value when the reducer's shape is not enough.
    pub snapshot: Option<SnapshotFn>,
    pub count: Option<CountFn>,
    pub render: RenderFn,
    pub render_console: Option<RenderFn>,
    pub render_toolbar: Option<RenderFn>,
}

impl PanelDefinition {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: String::new(),
            category: String::new(),
            order: None,
            event_types: Vec::new(),
            snapshot_key: None,
            supports_toolbar: true,
            reducer: Reducer::Replace,
            snapshot: None,
            count: None,
            render: Arc::new(render_json),
            render_console: None,
            render_toolbar: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_types.push(event_type.into());
        self
    }

    pub fn with_event_types<I, S>(mut self, event_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event_types.extend(event_types.into_iter().map(Into::into));
        self
    }

    pub fn with_snapshot_key(mut self, key: impl Into<String>) -> Self {
        self.snapshot_key = Some(key.into());
        self
    }

    pub fn without_toolbar(mut self) -> Self {
        self.supports_toolbar = false;
        self
    }

    pub fn with_reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = reducer;
        self
    }

    pub fn with_event_handler<F>(self, handler: F) -> Self
    where
        F: Fn(Option<PanelState>, &EventEnvelope) -> PanelState + Send + Sync + 'static,
    {
        self.with_reducer(Reducer::Custom(Arc::new(handler)))
    }

    pub fn with_snapshot_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(Value) -> PanelState + Send + Sync + 'static,
    {
        self.snapshot = Some(Arc::new(handler));
        self
    }

    pub fn with_count<F>(mut self, count: F) -> Self
    where
        F: Fn(Option<&PanelState>) -> usize + Send + Sync + 'static,
    {
        self.count = Some(Arc::new(count));
        self
    }

    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(Option<&PanelState>, &RenderContext) -> String + Send + Sync + 'static,
    {
        self.render = Arc::new(render);
        self
    }

    pub fn with_console_renderer<F>(mut self, render: F) -> Self
    where
        F: Fn(Option<&PanelState>, &RenderContext) -> String + Send + Sync + 'static,
    {
        self.render_console = Some(Arc::new(render));
        self
    }

    pub fn with_toolbar_renderer<F>(mut self, render: F) -> Self
    where
        F: Fn(Option<&PanelState>, &RenderContext) -> String + Send + Sync + 'static,
    {
        self.render_toolbar = Some(Arc::new(render));
        self
    }

    pub fn effective_order(&self) -> i32 {
        self.order.unwrap_or(DEFAULT_ORDER)
    }

    /// Key this panel's state is published under in snapshot payloads.
    pub fn snapshot_key(&self) -> &str {
        self.snapshot_key.as_deref().unwrap_or(&self.id)
    }

    pub fn listens_to(&self, event_type: &str) -> bool {
        self.event_types.iter().any(|t| t == event_type)
    }

    pub fn is_snapshot_only(&self) -> bool {
        self.event_types.is_empty()
    }

    pub fn has_console_renderer(&self) -> bool {
        self.render_console.is_some()
    }

    pub fn has_toolbar_renderer(&self) -> bool {
        self.render_toolbar.is_some()
    }

    /// Display count for `state`, falling back to [`count_of`].
    pub fn count(&self, state: Option<&PanelState>) -> usize {
        match &self.count {
            Some(count) => count(state),
            None => count_of(state),
        }
    }

    /// Fold `envelope` into `state`.
    pub fn reduce(&self, state: Option<PanelState>, envelope: &EventEnvelope) -> PanelState {
        match &self.reducer {
            Reducer::Append { capacity } => append_bounded(state, envelope.to_value(), *capacity),
            Reducer::Replace => PanelState::from_value(envelope.to_value()),
            Reducer::Merge => merge_object(state, envelope.to_value()),
            Reducer::Custom(handler) => handler(state, envelope),
        }
    }

    /// State for a snapshot value published under this panel's key.
    ///
    /// Ring-buffer panels keep only their newest `capacity` entries.
    pub fn from_snapshot(&self, value: Value) -> PanelState {
        if let Some(handler) = &self.snapshot {
            return handler(value);
        }
        match (&self.reducer, value) {
            (Reducer::Append { capacity }, Value::Array(items)) if *capacity > 0 => {
                let skip = items.len().saturating_sub(*capacity);
                PanelState::Sequence(items.into_iter().skip(skip).collect())
            }
            (_, value) => PanelState::from_value(value),
        }
    }
}

impl fmt::Debug for PanelDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelDefinition")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("category", &self.category)
            .field("order", &self.order)
            .field("event_types", &self.event_types)
            .field("supports_toolbar", &self.supports_toolbar)
            .field("reducer", &self.reducer)
            .finish_non_exhaustive()
    }
}
