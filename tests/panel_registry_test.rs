use std::sync::{Arc, Mutex};

use devconsole::panels::{
    self, register_builtins, render_panel, PanelDefinition, PanelRegistry, RenderContext, Surface,
    TOOLBAR_UNAVAILABLE,
};

fn builtin_registry() -> PanelRegistry {
    let registry = PanelRegistry::new();
    register_builtins(&registry);
    registry
}

#[test]
fn test_sorted_ids_group_by_category() {
    assert_eq!(
        builtin_registry().sorted_ids(),
        vec!["config", "template", "session", "sql", "requests", "routes", "logs", "custom"]
    );
}

#[test]
fn test_event_types_are_order_insensitive() {
    let forward = builtin_registry();
    let reverse = PanelRegistry::new();
    for panel in panels::builtin::builtin_panels().into_iter().rev() {
        reverse.register(panel);
    }

    let mut a = forward.all_event_types();
    let mut b = reverse.all_event_types();
    a.sort();
    b.sort();
    assert_eq!(a, b);
    assert_eq!(a.len(), 8);
}

#[test]
fn test_find_by_event_type_survives_duplicate_registration() {
    let registry = builtin_registry();
    registry.register(PanelDefinition::new("sql_copy", "SQL copy").with_event_type("sql"));
    assert_eq!(registry.find_by_event_type("sql").unwrap().id, "sql");

    registry.unregister("sql");
    assert_eq!(registry.find_by_event_type("sql").unwrap().id, "sql_copy");
}

#[test]
fn test_change_events_carry_panel() {
    let registry = PanelRegistry::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = registry.subscribe(move |change| {
        let label = change.panel().map(|p| p.label.clone());
        sink.lock()
            .unwrap()
            .push((change.kind(), change.panel_id().to_string(), label));
    });

    registry.register(PanelDefinition::new("perf", "Performance"));
    registry.unregister("perf");
    subscription.unsubscribe();
    registry.register(PanelDefinition::new("perf", "Performance"));

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ("register", "perf".to_string(), Some("Performance".to_string())),
            ("unregister", "perf".to_string(), None),
        ]
    );
}

#[test]
fn test_toolbar_dispatch_for_builtins() {
    let registry = builtin_registry();
    let ctx = RenderContext::default();
    for panel in registry.list() {
        let html = render_panel(&panel, None, Surface::Toolbar, &ctx);
        if panel.supports_toolbar {
            assert_ne!(html, TOOLBAR_UNAVAILABLE, "{}", panel.id);
        } else {
            assert_eq!(html, TOOLBAR_UNAVAILABLE, "{}", panel.id);
        }
    }
}

#[test]
fn test_global_registry_is_shared() {
    let registry = panels::init();
    assert!(registry.has("custom"));
    assert!(std::ptr::eq(registry, panels::init()));
}
