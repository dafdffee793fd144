//! Loosely typed tool-call result as delivered to a widget by the host.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One item of a tool result's `content` list.
///
/// Items the widget does not understand (images, resources, ...) decode to
/// [`ContentItem::Other`] instead of failing the whole result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Json {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        json: Option<Value>,
    },
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    #[serde(other)]
    Other,
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: Some(text.into()) }
    }

    pub fn json(json: Value) -> Self {
        Self::Json { json: Some(json) }
    }
}

/// Result of a tool invocation: a content list, a structured object, or both.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    #[serde(default)]
    pub content: Vec<ContentItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolResult {
    /// Whether the server flagged this result as a tool error.
    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// The `json` field of the first `json`-tagged item that carries one.
    pub fn first_json(&self) -> Option<&Value> {
        self.content.iter().find_map(|item| match item {
            ContentItem::Json { json: Some(json) } => Some(json),
            _ => None,
        })
    }

    /// The text of the first `text`-tagged item, if that item has a text field.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|item| match item {
            ContentItem::Text { text } => Some(text.as_deref()),
            _ => None,
        })?
    }
}
