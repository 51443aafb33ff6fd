//! Small readers for upstream stage payloads.

use serde_json::Value;

/// String field, empty when absent or not a string.
pub fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// String elements of an array field; other elements are skipped.
pub fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Contact entries from a contact-stage payload: `prioritized_contacts` or a bare array.
pub fn contact_list(payload: &Value) -> &[Value] {
    payload
        .get("prioritized_contacts")
        .and_then(Value::as_array)
        .or_else(|| payload.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default()
}
