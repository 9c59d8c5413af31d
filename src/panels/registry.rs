//! Keyed collection of panel definitions with change notification.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use tracing::debug;

use super::definition::PanelDefinition;

/// Delivered to listeners whenever the panel set changes.
#[derive(Debug, Clone)]
pub enum RegistryChange {
    Register { panel: Arc<PanelDefinition> },
    Unregister { panel_id: String },
}

impl RegistryChange {
    /// `"register"` or `"unregister"`.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryChange::Register { .. } => "register",
            RegistryChange::Unregister { .. } => "unregister",
        }
    }

    pub fn panel_id(&self) -> &str {
        match self {
            RegistryChange::Register { panel } => &panel.id,
            RegistryChange::Unregister { panel_id } => panel_id,
        }
    }

    pub fn panel(&self) -> Option<&Arc<PanelDefinition>> {
        match self {
            RegistryChange::Register { panel } => Some(panel),
            RegistryChange::Unregister { .. } => None,
        }
    }
}

type Listener = Arc<dyn Fn(&RegistryChange) + Send + Sync>;

#[derive(Default)]
struct RegistryInner {
    panels: RwLock<Vec<Arc<PanelDefinition>>>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
}

impl RegistryInner {
    fn remove_listener(&self, id: u64) {
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        listeners.retain(|(listener_id, _)| *listener_id != id);
    }
}

/// Panel definitions in registration order.
///
/// Cloning yields another handle to the same registry. All operations are
/// synchronous; listeners run on the caller's thread after the change is
/// applied and may call back into the registry.
#[derive(Clone, Default)]
pub struct PanelRegistry {
    inner: Arc<RegistryInner>,
}

impl PanelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Arc<PanelDefinition>>> {
        self.inner.panels.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Arc<PanelDefinition>>> {
        self.inner.panels.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a panel. An existing panel with the same id is replaced in place.
    pub fn register(&self, panel: PanelDefinition) -> Arc<PanelDefinition> {
        let panel = Arc::new(panel);
        {
            let mut panels = self.write();
            match panels.iter_mut().find(|p| p.id == panel.id) {
                Some(slot) => *slot = Arc::clone(&panel),
                None => panels.push(Arc::clone(&panel)),
            }
        }
        debug!(panel = %panel.id, "Registered panel");
        self.emit(&RegistryChange::Register {
            panel: Arc::clone(&panel),
        });
        panel
    }

    /// Remove a panel. Returns `None` and notifies nobody if `id` is unknown.
    pub fn unregister(&self, id: &str) -> Option<Arc<PanelDefinition>> {
        let removed = {
            let mut panels = self.write();
            let index = panels.iter().position(|p| p.id == id)?;
            panels.remove(index)
        };
        debug!(panel = %id, "Unregistered panel");
        self.emit(&RegistryChange::Unregister {
            panel_id: id.to_string(),
        });
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<Arc<PanelDefinition>> {
        self.read().iter().find(|p| p.id == id).cloned()
    }

    pub fn has(&self, id: &str) -> bool {
        self.read().iter().any(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn list(&self) -> Vec<Arc<PanelDefinition>> {
        self.read().clone()
    }

    pub fn ids(&self) -> Vec<String> {
        self.read().iter().map(|p| p.id.clone()).collect()
    }

    /// Ids ordered by category, then order (default 100), then registration.
    pub fn sorted_ids(&self) -> Vec<String> {
        let mut panels = self.list();
        // sort_by is stable, so ties keep registration order
        panels.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.effective_order().cmp(&b.effective_order()))
        });
        panels.iter().map(|p| p.id.clone()).collect()
    }

    pub fn toolbar_panels(&self) -> Vec<Arc<PanelDefinition>> {
        self.read()
            .iter()
            .filter(|p| p.supports_toolbar)
            .cloned()
            .collect()
    }

    /// De-duplicated union of every panel's event types.
    pub fn all_event_types(&self) -> Vec<String> {
        let mut types: Vec<String> = Vec::new();
        for panel in self.read().iter() {
            for event_type in &panel.event_types {
                if !types.contains(event_type) {
                    types.push(event_type.clone());
                }
            }
        }
        types
    }

    /// First panel, in registration order, that listens to `event_type`.
    pub fn find_by_event_type(&self, event_type: &str) -> Option<Arc<PanelDefinition>> {
        self.read().iter().find(|p| p.listens_to(event_type)).cloned()
    }

    /// Call `listener` with every future change.
    ///
    /// The listener stays attached until [`Subscription::unsubscribe`] is
    /// called; dropping the handle does not detach it.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&RegistryChange) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(listener)));
        Subscription {
            registry: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Like [`subscribe`](Self::subscribe) but without the change payload.
    pub fn on_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe(move |_| callback())
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    fn emit(&self, change: &RegistryChange) {
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(change);
        }
    }
}

impl std::fmt::Debug for PanelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelRegistry")
            .field("ids", &self.ids())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Handle returned by [`PanelRegistry::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<RegistryInner>,
    id: u64,
}

impl Subscription {
    /// Detach the listener. Calling this more than once is harmless.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.registry.upgrade() {
            inner.remove_listener(self.id);
        }
    }
}
