//! Built-in panels and the process-wide default registry.

use once_cell::sync::OnceCell;
use serde_json::{json, Map, Value};

use super::definition::{PanelDefinition, Reducer};
use super::registry::PanelRegistry;
use super::render::{empty_message, escape_html, RenderContext};
use super::state::{append_bounded, merge_object, PanelState};
use crate::websocket::EventEnvelope;

pub const REQUESTS_CAPACITY: usize = 500;
pub const SQL_CAPACITY: usize = 500;
pub const LOGS_CAPACITY: usize = 1000;
pub const CUSTOM_LOG_CAPACITY: usize = 200;

static GLOBAL_REGISTRY: OnceCell<PanelRegistry> = OnceCell::new();

/// Registry holding the built-in panels, created on first use.
///
/// Further calls return the same instance; panels registered on it later
/// are visible to every caller.
pub fn init() -> &'static PanelRegistry {
    GLOBAL_REGISTRY.get_or_init(|| {
        let registry = PanelRegistry::new();
        register_builtins(&registry);
        registry
    })
}

/// Register every built-in panel on `registry`.
pub fn register_builtins(registry: &PanelRegistry) {
    for panel in builtin_panels() {
        registry.register(panel);
    }
}

pub fn builtin_panels() -> Vec<PanelDefinition> {
    vec![
        requests_panel(),
        sql_panel(),
        logs_panel(),
        routes_panel(),
        config_panel(),
        template_panel(),
        session_panel(),
        custom_panel(),
    ]
}

fn requests_panel() -> PanelDefinition {
    PanelDefinition::new("requests", "Requests")
        .with_icon("globe")
        .with_category("http")
        .with_order(10)
        .with_event_type("request")
        .with_reducer(Reducer::Append {
            capacity: REQUESTS_CAPACITY,
        })
        .with_render(|state, ctx| {
            let entries = newest_first(state, ctx);
            if entries.is_empty() {
                return empty_message(ctx, "No requests captured");
            }
            let mut headers = vec!["Method", "Path", "Status", "Duration"];
            if ctx.options.show_timestamps {
                headers.push("Time");
            }
            let rows = entries
                .iter()
                .map(|entry| {
                    let mut row = vec![
                        escape_html(&text(entry, "method")),
                        escape_html(&text(entry, "path")),
                        status_cell(entry, ctx),
                        escape_html(&duration(entry)),
                    ];
                    if ctx.options.show_timestamps {
                        row.push(escape_html(&text(entry, "timestamp")));
                    }
                    row
                })
                .collect();
            table(ctx, &headers, rows)
        })
        .with_console_renderer(|state, ctx| {
            console_lines(state, ctx, |entry| {
                format!(
                    "{} {} {} {}",
                    text(entry, "method"),
                    text(entry, "path"),
                    text(entry, "status"),
                    duration(entry)
                )
            })
        })
        .with_toolbar_renderer(|state, ctx| badge("Requests", state_len(state), ctx))
}

fn sql_panel() -> PanelDefinition {
    PanelDefinition::new("sql", "SQL")
        .with_icon("database")
        .with_category("database")
        .with_order(20)
        .with_event_type("sql")
        .with_reducer(Reducer::Append {
            capacity: SQL_CAPACITY,
        })
        .with_render(|state, ctx| {
            let entries = newest_first(state, ctx);
            if entries.is_empty() {
                return empty_message(ctx, "No queries captured");
            }
            let rows = entries
                .iter()
                .map(|entry| {
                    vec![
                        ctx.highlighter.highlight(&text(entry, "sql"), "sql"),
                        escape_html(&duration(entry)),
                    ]
                })
                .collect();
            table(ctx, &["Query", "Duration"], rows)
        })
        .with_console_renderer(|state, ctx| {
            console_lines(state, ctx, |entry| {
                format!("[{}] {}", duration(entry), text(entry, "sql"))
            })
        })
        .with_toolbar_renderer(|state, ctx| badge("SQL", state_len(state), ctx))
}

fn logs_panel() -> PanelDefinition {
    PanelDefinition::new("logs", "Logs")
        .with_icon("list")
        .with_category("logging")
        .with_order(30)
        .with_event_type("log")
        .with_reducer(Reducer::Append {
            capacity: LOGS_CAPACITY,
        })
        .with_render(|state, ctx| {
            let entries = newest_first(state, ctx);
            if entries.is_empty() {
                return empty_message(ctx, "No log records");
            }
            let palette = ctx.palette();
            let rows = entries
                .iter()
                .map(|entry| {
                    let level = text(entry, "level");
                    let color = match level.to_ascii_lowercase().as_str() {
                        "error" | "critical" => palette.error,
                        "warning" | "warn" => palette.accent,
                        _ => palette.muted,
                    };
                    vec![
                        format!(
                            "<span style=\"color:{}\">{}</span>",
                            color,
                            escape_html(&level.to_ascii_uppercase())
                        ),
                        escape_html(&text(entry, "message")),
                        escape_html(&text(entry, "logger")),
                    ]
                })
                .collect();
            table(ctx, &["Level", "Message", "Logger"], rows)
        })
        .with_console_renderer(|state, ctx| {
            console_lines(state, ctx, |entry| {
                format!(
                    "[{}] {}",
                    text(entry, "level").to_ascii_uppercase(),
                    text(entry, "message")
                )
            })
        })
        .with_toolbar_renderer(|state, ctx| badge("Logs", state_len(state), ctx))
}

fn routes_panel() -> PanelDefinition {
    PanelDefinition::new("routes", "Routes")
        .with_icon("map")
        .with_category("http")
        .with_order(40)
        .without_toolbar()
        .with_render(|state, ctx| match state {
            Some(PanelState::Sequence(_)) => {
                let entries = newest_first(state, ctx);
                let rows = entries
                    .iter()
                    .map(|route| {
                        vec![
                            escape_html(&text(route, "methods")),
                            escape_html(&text(route, "path")),
                            escape_html(&text(route, "name")),
                        ]
                    })
                    .collect();
                table(ctx, &["Methods", "Path", "Name"], rows)
            }
            other => definition_list(other, ctx, "No routes loaded"),
        })
}

fn config_panel() -> PanelDefinition {
    PanelDefinition::new("config", "Config")
        .with_icon("settings")
        .with_category("app")
        .with_order(10)
        .with_event_type("config")
        .without_toolbar()
        .with_count(count_fields)
        .with_render(|state, ctx| definition_list(state, ctx, "No configuration"))
}

fn template_panel() -> PanelDefinition {
    PanelDefinition::new("template", "Template")
        .with_icon("file")
        .with_category("app")
        .with_order(20)
        .with_event_type("template")
        .with_count(count_fields)
        .with_render(|state, ctx| definition_list(state, ctx, "No template rendered"))
        .with_toolbar_renderer(|state, ctx| {
            let name = state
                .and_then(PanelState::as_object)
                .and_then(|map| map.get("name"))
                .map(display_value)
                .unwrap_or_default();
            format!(
                "<span class=\"dc-badge\" style=\"color:{}\">Template {}</span>",
                ctx.palette().accent,
                escape_html(&name)
            )
        })
}

fn session_panel() -> PanelDefinition {
    PanelDefinition::new("session", "Session")
        .with_icon("user")
        .with_category("app")
        .with_order(30)
        .with_event_type("session")
        .with_count(count_fields)
        .with_render(|state, ctx| definition_list(state, ctx, "No session data"))
        .with_toolbar_renderer(|state, ctx| badge("Session", count_fields(state), ctx))
}

fn custom_panel() -> PanelDefinition {
    PanelDefinition::new("custom", "Custom")
        .with_icon("star")
        .with_category("user")
        .with_event_types(["custom", "custom_log"])
        .with_event_handler(reduce_custom)
        .with_snapshot_handler(custom_from_snapshot)
        .with_count(count_custom)
        .with_render(|state, ctx| {
            let (data, logs) = split_custom(state.cloned());
            if data.is_empty() && logs.is_empty() {
                return empty_message(ctx, "No custom data");
            }
            let data = PanelState::Mapping(data);
            let mut out = definition_list(Some(&data), ctx, "No values");
            let limit = ctx.options.limit.unwrap_or(usize::MAX);
            out.push_str("<ul class=\"dc-custom-logs\">");
            for entry in logs.iter().rev().take(limit) {
                out.push_str("<li>");
                out.push_str(&escape_html(&text(entry, "message")));
                out.push_str("</li>");
            }
            out.push_str("</ul>");
            out
        })
        .with_toolbar_renderer(|state, ctx| badge("Custom", count_custom(state), ctx))
}

/// `custom` merges values into `data`; `custom_log` appends to `logs`.
fn reduce_custom(state: Option<PanelState>, envelope: &EventEnvelope) -> PanelState {
    let (data, logs) = split_custom(state);

    let (data, logs) = if envelope.event_type == "custom_log" {
        let logs = append_bounded(
            Some(PanelState::Sequence(logs.into())),
            envelope.to_value(),
            CUSTOM_LOG_CAPACITY,
        );
        (data, logs.to_value())
    } else {
        let update = match (envelope.field("data"), envelope.field("key")) {
            (Some(Value::Object(values)), _) => Value::Object(values.clone()),
            (_, Some(Value::String(key))) => {
                let mut single = Map::new();
                single.insert(
                    key.clone(),
                    envelope.field("value").cloned().unwrap_or(Value::Null),
                );
                Value::Object(single)
            }
            _ => Value::Object(Map::new()),
        };
        let data = match merge_object(Some(PanelState::Mapping(data)), update) {
            PanelState::Mapping(map) => map,
            _ => Map::new(),
        };
        (data, Value::Array(logs))
    };

    PanelState::Custom(json!({ "data": data, "logs": logs }))
}

fn custom_from_snapshot(value: Value) -> PanelState {
    let (data, mut logs) = split_custom(Some(PanelState::from_value(value)));
    let excess = logs.len().saturating_sub(CUSTOM_LOG_CAPACITY);
    logs.drain(..excess);
    PanelState::Custom(json!({ "data": data, "logs": logs }))
}

fn count_custom(state: Option<&PanelState>) -> usize {
    let (data, logs) = split_custom(state.cloned());
    data.len() + logs.len()
}

fn split_custom(state: Option<PanelState>) -> (Map<String, Value>, Vec<Value>) {
    let mut composite = match state {
        Some(PanelState::Custom(Value::Object(map))) | Some(PanelState::Mapping(map)) => map,
        _ => return (Map::new(), Vec::new()),
    };
    let data = match composite.remove("data") {
        Some(Value::Object(data)) => data,
        _ => Map::new(),
    };
    let logs = match composite.remove("logs") {
        Some(Value::Array(logs)) => logs,
        _ => Vec::new(),
    };
    (data, logs)
}

/// Keys shown by [`definition_list`], which skips the envelope `type`.
fn count_fields(state: Option<&PanelState>) -> usize {
    state
        .and_then(PanelState::as_object)
        .map_or(0, |map| map.keys().filter(|k| k.as_str() != "type").count())
}

fn state_len(state: Option<&PanelState>) -> usize {
    state.and_then(PanelState::as_sequence).map_or(0, |s| s.len())
}

/// Sequence entries, newest first, cut to the render limit.
fn newest_first<'a>(state: Option<&'a PanelState>, ctx: &RenderContext) -> Vec<&'a Value> {
    let limit = ctx.options.limit.unwrap_or(usize::MAX);
    state
        .and_then(PanelState::as_sequence)
        .map(|items| items.iter().rev().take(limit).collect())
        .unwrap_or_default()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn text(entry: &Value, key: &str) -> String {
    entry.get(key).map(display_value).unwrap_or_default()
}

fn duration(entry: &Value) -> String {
    match entry.get("duration_ms").and_then(Value::as_f64) {
        Some(ms) => format!("{:.1}ms", ms),
        None => String::new(),
    }
}

fn status_cell(entry: &Value, ctx: &RenderContext) -> String {
    let status = entry.get("status").and_then(Value::as_u64).unwrap_or(0);
    let palette = ctx.palette();
    let color = if status >= 400 {
        palette.error
    } else {
        palette.foreground
    };
    format!(
        "<span style=\"color:{}\">{}</span>",
        color,
        escape_html(&text(entry, "status"))
    )
}

fn table(ctx: &RenderContext, headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let palette = ctx.palette();
    let mut out = format!(
        "<table class=\"dc-table\" style=\"color:{};background:{};border-color:{}\"><thead><tr>",
        palette.foreground, palette.background, palette.border
    );
    for header in headers {
        out.push_str("<th>");
        out.push_str(&escape_html(header));
        out.push_str("</th>");
    }
    out.push_str("</tr></thead><tbody>");
    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str("<td>");
            out.push_str(&cell);
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}

fn definition_list(state: Option<&PanelState>, ctx: &RenderContext, empty: &str) -> String {
    let map = match state.and_then(PanelState::as_object) {
        Some(map) if map.keys().any(|k| k != "type") => map,
        _ => return empty_message(ctx, empty),
    };
    let palette = ctx.palette();
    let mut out = format!("<dl class=\"dc-dl\" style=\"color:{}\">", palette.foreground);
    for (key, value) in map.iter().filter(|(k, _)| k.as_str() != "type") {
        let rendered = match value {
            Value::Object(_) | Value::Array(_) => {
                serde_json::to_string_pretty(value).unwrap_or_default()
            }
            other => display_value(other),
        };
        out.push_str(&format!(
            "<dt style=\"color:{}\">{}</dt><dd>{}</dd>",
            palette.muted,
            escape_html(key),
            escape_html(&rendered)
        ));
    }
    out.push_str("</dl>");
    out
}

fn console_lines<F>(state: Option<&PanelState>, ctx: &RenderContext, line: F) -> String
where
    F: Fn(&Value) -> String,
{
    newest_first(state, ctx)
        .into_iter()
        .map(|entry| escape_html(&line(entry)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn badge(label: &str, count: usize, ctx: &RenderContext) -> String {
    format!(
        "<span class=\"dc-badge\" style=\"color:{}\">{} <b>{}</b></span>",
        ctx.palette().accent,
        escape_html(label),
        count
    )
}
