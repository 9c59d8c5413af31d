//! Panel definitions, registry, accumulated state and rendering.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`state`] | [`PanelState`] and the merge functions |
//! | [`definition`] | [`PanelDefinition`] and [`Reducer`] |
//! | [`registry`] | [`PanelRegistry`] with change notification |
//! | [`render`] | Surface dispatch, themes, HTML escaping |
//! | [`builtin`] | Built-in panels and the default registry |
//! | [`store`] | [`PanelStore`], per-session state keyed by panel id |
//!
//! ```
//! use devconsole::panels::{self, PanelStore};
//! use devconsole::websocket::EventEnvelope;
//!
//! let registry = panels::init();
//! let mut store = PanelStore::new();
//! let envelope = EventEnvelope::parse(r#"{"type":"request","path":"/x"}"#).unwrap();
//! store.apply(registry, &envelope);
//! assert_eq!(store.count(&registry.get("requests").unwrap()), 1);
//! ```

pub mod builtin;
pub mod definition;
pub mod registry;
pub mod render;
pub mod state;
pub mod store;

pub use builtin::{init, register_builtins};
pub use definition::{PanelDefinition, Reducer, DEFAULT_ORDER};
pub use registry::{PanelRegistry, RegistryChange, Subscription};
pub use render::{
    escape_html, render_panel, resolve_renderer, RenderContext, RenderOptions, ResolvedRenderer,
    StyleTheme, Surface, TOOLBAR_UNAVAILABLE,
};
pub use state::{append_bounded, count_of, merge_object, PanelState};
pub use store::{Applied, PanelStore};
