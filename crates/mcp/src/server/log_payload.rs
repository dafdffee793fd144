//! Shaping of per-tool log entries.
//!
//! Every payload is passed through secret redaction. The secondary entry
//! carries JSON recovered from the first `text` content item, and is only
//! produced when that JSON adds something the structured content does not.

use serde_json::{Map, Value};
use skydeck_util::redact_json;

const MAX_TEXT_PARSE_BYTES: usize = 256 * 1024;
const MAX_PARSED_ENTRY_BYTES: usize = 512 * 1024;

/// Builds the primary log payload from the tool arguments and result.
///
/// Returns `None` when both values are absent.
pub(crate) fn tool_log_payload(request: Option<&Value>, response: Option<&Value>) -> Option<Value> {
    let mut payload = Map::new();
    if let Some(request_value) = request {
        payload.insert("request".to_string(), redact_json(request_value));
    }
    if let Some(response_value) = response {
        payload.insert("response".to_string(), redact_json(response_value));
    }
    if payload.is_empty() { None } else { Some(Value::Object(payload)) }
}

/// Builds the secondary payload holding JSON parsed out of the result's text
/// content.
///
/// Skipped when the text is not a JSON object or array, when it merely
/// repeats `structuredContent`, or when the entry would exceed the size
/// guardrail.
pub(crate) fn parsed_text_payload(request: Option<&Value>, response: Option<&Value>) -> Option<Value> {
    let response_value = response?;
    let parsed_text = parse_text_content(response_value)?;
    if response_value.get("structuredContent") == Some(&parsed_text) {
        return None;
    }

    let mut payload = Map::new();
    if let Some(request_value) = request {
        payload.insert("request".to_string(), redact_json(request_value));
    }
    payload.insert("parsed_text".to_string(), redact_json(&parsed_text));
    let payload_value = Value::Object(payload);
    within_size_limit(&payload_value).then_some(payload_value)
}

fn within_size_limit(payload: &Value) -> bool {
    serde_json::to_vec(payload)
        .map(|bytes| bytes.len() <= MAX_PARSED_ENTRY_BYTES)
        .unwrap_or(false)
}

fn parse_text_content(response: &Value) -> Option<Value> {
    let text = first_text_field(response)?;
    if text.len() > MAX_TEXT_PARSE_BYTES {
        return None;
    }
    let parsed = serde_json::from_str::<Value>(text).ok()?;
    (parsed.is_object() || parsed.is_array()).then_some(parsed)
}

fn first_text_field(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => {
            if let Some(text_value) = map.get("text").and_then(Value::as_str) {
                return Some(text_value);
            }
            map.values().find_map(first_text_field)
        }
        Value::Array(items) => items.iter().find_map(first_text_field),
        _ => None,
    }
}
