use devconsole::websocket::{Command, EventEnvelope, Frame};
use serde_json::{json, Value};

#[test]
fn test_outbound_command_shapes() {
    let encode = |command: &Command| -> Value {
        serde_json::from_str(&serde_json::to_string(command).unwrap()).unwrap()
    };

    assert_eq!(
        encode(&Command::subscribe(&["requests", "sql"])),
        json!({"type": "subscribe", "panels": ["requests", "sql"]})
    );
    assert_eq!(
        encode(&Command::unsubscribe(&["logs"])),
        json!({"type": "unsubscribe", "panels": ["logs"]})
    );
    assert_eq!(encode(&Command::snapshot()), json!({"type": "snapshot"}));
    assert_eq!(
        encode(&Command::clear(&["requests"])),
        json!({"type": "clear", "panels": ["requests"]})
    );
}

#[test]
fn test_deserialize_event_envelope() {
    let json = r#"{
        "type": "request",
        "method": "POST",
        "path": "/orders",
        "status": 201,
        "duration_ms": 12.5
    }"#;

    let envelope = EventEnvelope::parse(json).unwrap();
    assert_eq!(envelope.event_type, "request");
    assert_eq!(envelope.field("method"), Some(&json!("POST")));
    assert_eq!(envelope.field("status"), Some(&json!(201)));
    assert_eq!(envelope.to_value()["type"], "request");
}

#[test]
fn test_rejects_malformed_frames() {
    for raw in [
        "",
        "not json",
        "42",
        r#""request""#,
        r#"[{"type":"request"}]"#,
        r#"{"method":"GET"}"#,
        r#"{"type":7}"#,
    ] {
        assert!(EventEnvelope::parse(raw).is_none(), "accepted {:?}", raw);
    }
    assert!(EventEnvelope::from_frame(&Frame::Binary(b"{\"type\":\"log\"}".to_vec())).is_none());
}

#[test]
fn test_command_from_json_without_type_is_invalid() {
    let command: Command = serde_json::from_str(r#"{"panels":["sql"]}"#).unwrap();
    assert!(!command.is_valid());
}
