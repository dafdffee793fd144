//! Recovery of a typed payload from a tool-call result.
//!
//! A host may deliver the same payload as structured content, as a
//! `json`-tagged content item, or as JSON encoded inside a `text` item.
//! Candidates are tried in that order and the first one that passes the
//! payload's shape check wins; nothing is merged across representations.

use serde::de::DeserializeOwned;
use serde_json::Value;
use skydeck_types::{TaskBoard, ToolResult, WeatherObservation};
use tracing::{debug, warn};

/// A payload type that can be recognized inside an untyped JSON value.
pub trait ToolPayload: DeserializeOwned {
    /// Cheap structural check run before deserialization.
    fn matches_shape(value: &Value) -> bool;
}

impl ToolPayload for WeatherObservation {
    fn matches_shape(value: &Value) -> bool {
        let Some(object) = value.as_object() else {
            return false;
        };
        let is_string = |key: &str| object.get(key).is_some_and(Value::is_string);
        // A sentinel temperature arrives as `null`; finiteness is not required.
        let temperature_is_numeric = object
            .get("temperatureC")
            .is_some_and(|temperature| temperature.is_number() || temperature.is_null());

        is_string("location") && is_string("description") && is_string("observedAt") && is_string("source") && temperature_is_numeric
    }
}

impl ToolPayload for TaskBoard {
    fn matches_shape(value: &Value) -> bool {
        value.get("tasks").is_some_and(Value::is_array)
    }
}

/// Which representation a payload was recovered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    StructuredContent,
    JsonContent,
    TextContent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPayload<P> {
    pub payload: P,
    pub source: PayloadSource,
}

/// Recover the canonical payload, or `None` when no representation holds one.
///
/// Absence is not an error; callers decide how to present an empty result.
pub fn extract_payload<P: ToolPayload>(result: Option<&ToolResult>) -> Option<P> {
    resolve_payload(result).map(|resolved| resolved.payload)
}

/// Like [`extract_payload`], also reporting which representation matched.
pub fn resolve_payload<P: ToolPayload>(result: Option<&ToolResult>) -> Option<ResolvedPayload<P>> {
    let result = result?;

    if let Some(payload) = result.structured_content.as_ref().and_then(accept::<P>) {
        return Some(ResolvedPayload {
            payload,
            source: PayloadSource::StructuredContent,
        });
    }

    if let Some(payload) = result.first_json().and_then(accept::<P>) {
        return Some(ResolvedPayload {
            payload,
            source: PayloadSource::JsonContent,
        });
    }

    let text = result.first_text()?;
    match serde_json::from_str::<Value>(text) {
        Ok(parsed) => accept::<P>(&parsed).map(|payload| ResolvedPayload {
            payload,
            source: PayloadSource::TextContent,
        }),
        Err(error) => {
            warn!(%error, "failed to parse payload from text content");
            None
        }
    }
}

fn accept<P: ToolPayload>(value: &Value) -> Option<P> {
    if !P::matches_shape(value) {
        return None;
    }
    match serde_json::from_value::<P>(value.clone()) {
        Ok(payload) => Some(payload),
        Err(error) => {
            debug!(%error, "payload matched shape but failed to decode");
            None
        }
    }
}
