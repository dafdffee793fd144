//! Capabilities a host may grant to a widget.
//!
//! Both capabilities are optional: a widget loaded outside a host session has
//! neither, and callers must degrade instead of failing.

use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};
use skydeck_types::{HostGlobalsPatch, ToolResult};
use thiserror::Error;

use crate::context::HostContext;

/// Errors reported by the host side of a capability call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("Tool call failed: {tool_name} - {message}")]
    ToolCall { tool_name: String, message: String },

    #[error("Widget state write failed: {message}")]
    StateWrite { message: String },
}

impl HostError {
    pub fn tool_call(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolCall {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    pub fn state_write(message: impl Into<String>) -> Self {
        Self::StateWrite { message: message.into() }
    }
}

/// Asks the host to invoke a named tool on the widget's behalf.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> Result<ToolResult, HostError>;
}

/// Persists the widget's durable state. Each write replaces the stored value
/// wholesale.
#[async_trait]
pub trait WidgetStateStore: Send + Sync {
    async fn set_widget_state(&self, state: Value) -> Result<(), HostError>;
}

/// The capabilities available in the current session.
#[derive(Clone, Default)]
pub struct HostCapabilities {
    pub tool_invoker: Option<Arc<dyn ToolInvoker>>,
    pub state_store: Option<Arc<dyn WidgetStateStore>>,
}

impl HostCapabilities {
    pub fn with_tool_invoker(mut self, invoker: Arc<dyn ToolInvoker>) -> Self {
        self.tool_invoker = Some(invoker);
        self
    }

    pub fn with_state_store(mut self, store: Arc<dyn WidgetStateStore>) -> Self {
        self.state_store = Some(store);
        self
    }
}

impl fmt::Debug for HostCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostCapabilities")
            .field("tool_invoker", &self.tool_invoker.is_some())
            .field("state_store", &self.state_store.is_some())
            .finish()
    }
}

/// In-process widget-state store.
///
/// Records every write and, when attached to a [`HostContext`], replays the
/// written value as a `widgetState` push the way a real host does.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    writes: Mutex<Vec<Value>>,
    context: Option<HostContext>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attached_to(context: HostContext) -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
            context: Some(context),
        }
    }

    /// Every value written so far, oldest first.
    pub fn writes(&self) -> Vec<Value> {
        self.writes.lock().map(|writes| writes.clone()).unwrap_or_default()
    }

    pub fn last_write(&self) -> Option<Value> {
        self.writes().pop()
    }
}

#[async_trait]
impl WidgetStateStore for MemoryStateStore {
    async fn set_widget_state(&self, state: Value) -> Result<(), HostError> {
        self.writes
            .lock()
            .map_err(|error| HostError::state_write(format!("state store lock poisoned: {error}")))?
            .push(state.clone());
        if let Some(context) = &self.context {
            context.push(HostGlobalsPatch {
                widget_state: Some(state),
                ..HostGlobalsPatch::default()
            });
        }
        Ok(())
    }
}
