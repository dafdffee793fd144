//! Globals the host runtime pushes into a widget session.
//!
//! The host owns these values. A widget receives them as an initial snapshot
//! followed by partial patches; it never writes them back except through the
//! explicit widget-state write.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Pip,
    #[default]
    Inline,
    Fullscreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(rename = "type")]
    pub device_type: DeviceType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    pub hover: bool,
    pub touch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserAgent {
    pub device: DeviceInfo,
    pub capabilities: DeviceCapabilities,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SafeAreaInsets {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SafeArea {
    pub insets: SafeAreaInsets,
}

/// Identifies one field of [`HostGlobals`] for change notifications.
///
/// Serialized with the host's global names (`toolOutput`, `widgetState`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GlobalKey {
    Theme,
    UserAgent,
    Locale,
    MaxHeight,
    DisplayMode,
    SafeArea,
    ToolInput,
    ToolOutput,
    ToolResponseMetadata,
    WidgetState,
}

/// Full snapshot of host globals for one widget session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostGlobals {
    pub theme: Theme,
    pub user_agent: UserAgent,
    pub locale: String,
    pub max_height: Option<u32>,
    pub display_mode: DisplayMode,
    pub safe_area: SafeArea,
    /// Arguments the tool was last invoked with.
    pub tool_input: Map<String, Value>,
    /// Structured output of the last tool invocation.
    pub tool_output: Option<Value>,
    pub tool_response_metadata: Option<Value>,
    /// Last widget state the widget explicitly persisted.
    pub widget_state: Option<Value>,
}

/// A partial update of [`HostGlobals`].
///
/// Absent keys leave the snapshot untouched. For the nullable fields an
/// explicit JSON `null` clears the value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostGlobalsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<UserAgent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_mode: Option<DisplayMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_area: Option<SafeArea>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_input: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "present_value", skip_serializing_if = "Option::is_none")]
    pub tool_output: Option<Value>,
    #[serde(default, deserialize_with = "present_value", skip_serializing_if = "Option::is_none")]
    pub tool_response_metadata: Option<Value>,
    #[serde(default, deserialize_with = "present_value", skip_serializing_if = "Option::is_none")]
    pub widget_state: Option<Value>,
}

/// Keeps an explicit `null` as `Some(Value::Null)` so it can clear a field.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl HostGlobalsPatch {
    /// Keys carried by this patch.
    pub fn keys(&self) -> Vec<GlobalKey> {
        let mut keys = Vec::new();
        let checks = [
            (self.theme.is_some(), GlobalKey::Theme),
            (self.user_agent.is_some(), GlobalKey::UserAgent),
            (self.locale.is_some(), GlobalKey::Locale),
            (self.max_height.is_some(), GlobalKey::MaxHeight),
            (self.display_mode.is_some(), GlobalKey::DisplayMode),
            (self.safe_area.is_some(), GlobalKey::SafeArea),
            (self.tool_input.is_some(), GlobalKey::ToolInput),
            (self.tool_output.is_some(), GlobalKey::ToolOutput),
            (self.tool_response_metadata.is_some(), GlobalKey::ToolResponseMetadata),
            (self.widget_state.is_some(), GlobalKey::WidgetState),
        ];
        for (present, key) in checks {
            if present {
                keys.push(key);
            }
        }
        keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }
}

impl HostGlobals {
    /// Merge a patch into the snapshot, returning the keys the patch carried.
    pub fn apply(&mut self, patch: HostGlobalsPatch) -> Vec<GlobalKey> {
        let keys = patch.keys();
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(user_agent) = patch.user_agent {
            self.user_agent = user_agent;
        }
        if let Some(locale) = patch.locale {
            self.locale = locale;
        }
        if let Some(max_height) = patch.max_height {
            self.max_height = Some(max_height);
        }
        if let Some(display_mode) = patch.display_mode {
            self.display_mode = display_mode;
        }
        if let Some(safe_area) = patch.safe_area {
            self.safe_area = safe_area;
        }
        if let Some(tool_input) = patch.tool_input {
            self.tool_input = tool_input;
        }
        if let Some(tool_output) = patch.tool_output {
            self.tool_output = non_null(tool_output);
        }
        if let Some(metadata) = patch.tool_response_metadata {
            self.tool_response_metadata = non_null(metadata);
        }
        if let Some(widget_state) = patch.widget_state {
            self.widget_state = non_null(widget_state);
        }
        keys
    }
}

fn non_null(value: Value) -> Option<Value> {
    if value.is_null() { None } else { Some(value) }
}
