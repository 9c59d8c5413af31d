//! Accumulated per-panel state and the merge functions that fold events into it.

use std::collections::VecDeque;

use serde_json::{Map, Value};

/// State owned by exactly one panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    /// Ring buffer, newest entry last.
    Sequence(VecDeque<Value>),
    /// Flat key/value map, last write wins per key.
    Mapping(Map<String, Value>),
    /// Anything else, including composites owned by a custom reducer.
    Custom(Value),
}

impl PanelState {
    /// Classify a raw snapshot value by its JSON shape.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => PanelState::Sequence(items.into()),
            Value::Object(map) => PanelState::Mapping(map),
            other => PanelState::Custom(other),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            PanelState::Sequence(items) => Value::Array(items.iter().cloned().collect()),
            PanelState::Mapping(map) => Value::Object(map.clone()),
            PanelState::Custom(value) => value.clone(),
        }
    }

    pub fn as_sequence(&self) -> Option<&VecDeque<Value>> {
        match self {
            PanelState::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Map<String, Value>> {
        match self {
            PanelState::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// View the state as a JSON object, whichever variant holds it.
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            PanelState::Mapping(map) => Some(map),
            PanelState::Custom(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

impl From<Value> for PanelState {
    fn from(value: Value) -> Self {
        PanelState::from_value(value)
    }
}

/// Append `incoming` and keep only the newest `capacity` entries.
///
/// A `capacity` of 0 means unbounded. Any state that is not a sequence is
/// discarded and a fresh one-element sequence is started.
pub fn append_bounded(state: Option<PanelState>, incoming: Value, capacity: usize) -> PanelState {
    let mut items = match state {
        Some(PanelState::Sequence(items)) => items,
        _ => VecDeque::new(),
    };
    items.push_back(incoming);
    if capacity > 0 {
        while items.len() > capacity {
            items.pop_front();
        }
    }
    PanelState::Sequence(items)
}

/// Shallow key union when both sides are maps, otherwise full replacement.
pub fn merge_object(state: Option<PanelState>, incoming: Value) -> PanelState {
    match (state, incoming) {
        (Some(PanelState::Mapping(mut current)), Value::Object(update)) => {
            current.extend(update);
            PanelState::Mapping(current)
        }
        (_, incoming) => PanelState::from_value(incoming),
    }
}

/// Display count: sequence length, map key count, otherwise 1 or 0.
pub fn count_of(state: Option<&PanelState>) -> usize {
    match state {
        Some(PanelState::Sequence(items)) => items.len(),
        Some(PanelState::Mapping(map)) => map.len(),
        Some(PanelState::Custom(Value::Null)) | None => 0,
        Some(PanelState::Custom(_)) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_append_starts_sequence() {
        let state = append_bounded(None, json!(1), 10);
        assert_eq!(state, PanelState::Sequence(VecDeque::from(vec![json!(1)])));
    }

    #[test]
    fn test_append_keeps_last_capacity_entries() {
        let mut state = None;
        for i in 0..25 {
            state = Some(append_bounded(state, json!(i), 10));
        }
        let items = state.unwrap();
        let items = items.as_sequence().unwrap();
        assert_eq!(items.len(), 10);
        let expected: Vec<Value> = (15..25).map(|i| json!(i)).collect();
        assert_eq!(items.iter().cloned().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_append_zero_capacity_is_unbounded() {
        let mut state = None;
        for i in 0..2000 {
            state = Some(append_bounded(state, json!(i), 0));
        }
        assert_eq!(count_of(state.as_ref()), 2000);
    }

    #[test]
    fn test_append_replaces_non_sequence() {
        let state = append_bounded(Some(PanelState::Custom(json!("x"))), json!(1), 5);
        assert_eq!(count_of(Some(&state)), 1);
    }

    #[test]
    fn test_merge_object_unions_keys() {
        let state = merge_object(None, json!({"a": 1}));
        let state = merge_object(Some(state), json!({"b": 2}));
        assert_eq!(state.to_value(), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_merge_object_last_write_wins() {
        let state = merge_object(None, json!({"a": 1}));
        let state = merge_object(Some(state), json!({"a": 2}));
        assert_eq!(state.to_value(), json!({"a": 2}));
    }

    #[test]
    fn test_merge_object_replaces_non_map() {
        let state = merge_object(Some(PanelState::Mapping(Map::new())), json!([1, 2]));
        assert_eq!(state, PanelState::Sequence(VecDeque::from(vec![json!(1), json!(2)])));

        let state = merge_object(Some(PanelState::Custom(json!(3))), json!({"a": 1}));
        assert_eq!(state.to_value(), json!({"a": 1}));
    }

    #[test]
    fn test_count_of() {
        assert_eq!(count_of(None), 0);
        assert_eq!(count_of(Some(&PanelState::Custom(Value::Null))), 0);
        assert_eq!(count_of(Some(&PanelState::Custom(json!(false)))), 1);
        assert_eq!(count_of(Some(&PanelState::from_value(json!({"a": 1, "b": 2})))), 2);
        assert_eq!(count_of(Some(&PanelState::from_value(json!([1, 2, 3])))), 3);
    }

    #[test]
    fn test_as_object_sees_custom_composites() {
        let state = PanelState::Custom(json!({"data": {}, "logs": []}));
        assert!(state.as_object().unwrap().contains_key("logs"));
        assert!(state.as_mapping().is_none());
    }
}
