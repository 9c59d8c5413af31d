use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw frame as delivered by the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

/// Outbound command sent to the backend.
///
/// Serialized as `{"type": ..., ...payload}`. A command whose `type` is empty
/// is never sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "type", default)]
    pub command_type: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Command {
    /// Build a command of an arbitrary type with no payload.
    pub fn new(command_type: impl Into<String>) -> Self {
        Self {
            command_type: command_type.into(),
            payload: Map::new(),
        }
    }

    /// Attach a payload field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    /// `{"type":"subscribe","panels":[...]}`
    pub fn subscribe<S: AsRef<str>>(panels: &[S]) -> Self {
        Self::new("subscribe").with_field("panels", panel_list(panels))
    }

    /// `{"type":"unsubscribe","panels":[...]}`
    pub fn unsubscribe<S: AsRef<str>>(panels: &[S]) -> Self {
        Self::new("unsubscribe").with_field("panels", panel_list(panels))
    }

    /// `{"type":"snapshot"}`
    pub fn snapshot() -> Self {
        Self::new("snapshot")
    }

    /// `{"type":"clear","panels":[...]}`
    pub fn clear<S: AsRef<str>>(panels: &[S]) -> Self {
        Self::new("clear").with_field("panels", panel_list(panels))
    }

    /// Whether the command carries a usable `type`.
    pub fn is_valid(&self) -> bool {
        !self.command_type.is_empty()
    }
}

fn panel_list<S: AsRef<str>>(panels: &[S]) -> Value {
    Value::Array(
        panels
            .iter()
            .map(|p| Value::String(p.as_ref().to_string()))
            .collect(),
    )
}

/// Inbound telemetry event: `{"type": "<eventType>", ...fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl EventEnvelope {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Decode a text frame. Anything that is not a JSON object with a string
    /// `type` yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }

    /// Decode a raw frame; binary frames are never envelopes.
    pub fn from_frame(frame: &Frame) -> Option<Self> {
        match frame {
            Frame::Text(text) => Self::parse(text),
            Frame::Binary(_) => None,
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The `panels` field read as a list of panel ids. Non-string entries are skipped.
    pub fn panel_ids(&self) -> Vec<String> {
        match self.fields.get("panels") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The whole envelope as a JSON object, `type` included.
    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.fields.len() + 1);
        map.insert("type".to_string(), Value::String(self.event_type.clone()));
        for (k, v) in &self.fields {
            map.insert(k.clone(), v.clone());
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_subscribe_command() {
        let cmd = Command::subscribe(&["requests", "sql"]);
        let json: Value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json, json!({"type": "subscribe", "panels": ["requests", "sql"]}));
    }

    #[test]
    fn test_serialize_snapshot_command() {
        let json = serde_json::to_string(&Command::snapshot()).unwrap();
        assert_eq!(json, r#"{"type":"snapshot"}"#);
    }

    #[test]
    fn test_command_without_type_is_invalid() {
        let cmd: Command = serde_json::from_value(json!({"panels": ["logs"]})).unwrap();
        assert!(!cmd.is_valid());
        assert!(Command::clear(&["logs"]).is_valid());
    }

    #[test]
    fn test_parse_request_envelope() {
        let env = EventEnvelope::parse(r#"{"type":"request","method":"GET","path":"/x"}"#)
            .expect("valid envelope");
        assert_eq!(env.event_type, "request");
        assert_eq!(env.field("method"), Some(&json!("GET")));
        assert_eq!(env.field("path"), Some(&json!("/x")));
        assert!(env.field("type").is_none());
    }

    #[test]
    fn test_parse_rejects_malformed_frames() {
        assert!(EventEnvelope::parse("not json").is_none());
        assert!(EventEnvelope::parse("[1,2,3]").is_none());
        assert!(EventEnvelope::parse(r#"{"method":"GET"}"#).is_none());
        assert!(EventEnvelope::parse(r#"{"type":42}"#).is_none());
        assert!(EventEnvelope::from_frame(&Frame::Binary(b"{\"type\":\"log\"}".to_vec())).is_none());
    }

    #[test]
    fn test_panel_ids_skips_non_strings() {
        let env = EventEnvelope::parse(r#"{"type":"clear","panels":["requests",3,"sql"]}"#).unwrap();
        assert_eq!(env.panel_ids(), vec!["requests".to_string(), "sql".to_string()]);
        assert!(EventEnvelope::new("clear").panel_ids().is_empty());
    }

    #[test]
    fn test_to_value_includes_type() {
        let env = EventEnvelope::new("log").with_field("level", json!("info"));
        assert_eq!(env.to_value(), json!({"type": "log", "level": "info"}));
    }
}
