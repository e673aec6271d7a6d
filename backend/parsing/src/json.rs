//! JSON object payloads.

use rxscan_core::RecordBuilder;
use serde_json::Value;
use tracing::debug;

use crate::aliases::JSON_KEYS;

pub(crate) fn parse_json(payload: &str, record: &mut RecordBuilder) {
    let object = match serde_json::from_str::<Value>(payload.trim()) {
        Ok(Value::Object(object)) => object,
        Ok(other) => {
            debug!(kind = json_kind(&other), "JSON payload is not an object");
            return;
        }
        Err(e) => {
            debug!(error = %e, "Invalid JSON payload");
            return;
        }
    };

    for (field, keys) in JSON_KEYS.entries() {
        // First key present wins, whatever its value type.
        let Some(value) = keys.iter().find_map(|key| object.get(*key)) else {
            continue;
        };
        match value_to_text(value) {
            Some(text) => record.set(field, text),
            None => record.clear(field),
        }
    }
}

/// Render a JSON value as field text. `null` means "present but empty".
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
