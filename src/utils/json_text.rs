//! Conversions between request values and the text columns that hold
//! structured blobs (`address`, `legal`, `notes`).

use serde_json::Value as JsonValue;

/// Serializes a structured blob for storage.
pub fn to_stored_text(value: &JsonValue) -> String {
    value.to_string()
}

/// Free-form text is stored verbatim; anything else is serialized.
pub fn to_free_form_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Normalizes a structured value as received: text that parses as JSON is
/// taken as that JSON, other text as a JSON string.
pub fn from_request_value(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::String(s) => {
            serde_json::from_str(s).unwrap_or_else(|_| JsonValue::String(s.clone()))
        }
        other => other.clone(),
    }
}

/// Reads a stored blob back. Text that is not JSON comes back as a string.
pub fn from_stored_text(text: &str) -> JsonValue {
    serde_json::from_str(text).unwrap_or_else(|_| JsonValue::String(text.to_string()))
}
