//! In-process bridge from the widget runtime to the tool handlers.
//!
//! Lets the preview page and the CLI drive the widgets without a host: tool
//! calls go straight to [`SkydeckMcpCore::invoke`] and come back in the
//! loosely typed shape a host would deliver.

use async_trait::async_trait;
use rmcp::model::CallToolResult;
use serde_json::{Map, Value};
use skydeck_types::ToolResult;
use skydeck_widget::{HostError, ToolInvoker};

use crate::server::core::SkydeckMcpCore;

/// Re-read an rmcp result through its wire form.
pub fn tool_result_from_call(result: &CallToolResult) -> Result<ToolResult, serde_json::Error> {
    serde_json::to_value(result).and_then(serde_json::from_value)
}

#[derive(Clone)]
pub struct LocalToolInvoker {
    core: SkydeckMcpCore,
}

impl LocalToolInvoker {
    pub fn new(core: SkydeckMcpCore) -> Self {
        Self { core }
    }
}

#[async_trait]
impl ToolInvoker for LocalToolInvoker {
    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> Result<ToolResult, HostError> {
        let result = self
            .core
            .invoke(name, arguments)
            .await
            .map_err(|error| HostError::tool_call(name, error.message.to_string()))?;
        tool_result_from_call(&result).map_err(|error| HostError::tool_call(name, format!("unreadable tool result: {error}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OpenWeatherConfig, WidgetConfig};
    use crate::provider::OpenWeatherClient;
    use crate::server::core::McpToolServices;
    use skydeck_types::TaskBoard;
    use skydeck_widget::{HostCapabilities, LoadState, WeatherWidget, extract_payload};
    use std::sync::Arc;

    fn invoker() -> LocalToolInvoker {
        let client = OpenWeatherClient::new(OpenWeatherConfig::default()).expect("client");
        let services = McpToolServices::new(Arc::new(client), WidgetConfig::default());
        LocalToolInvoker::new(SkydeckMcpCore::new(None, Arc::new(services)))
    }

    #[tokio::test]
    async fn board_result_is_recoverable_by_the_widget() {
        let result = invoker().call_tool("kanban-board", Map::new()).await.expect("board result");
        let board: TaskBoard = extract_payload(Some(&result)).expect("task board payload");
        assert_eq!(board.tasks, skydeck_types::seed_tasks());
    }

    #[tokio::test]
    async fn weather_widget_surfaces_configuration_errors() {
        let capabilities = HostCapabilities::default().with_tool_invoker(Arc::new(invoker()));
        let mut widget = WeatherWidget::new(capabilities);
        assert_eq!(
            *widget.load_if_idle().await,
            LoadState::Error("OWM_API_KEY is not configured on the server.".into())
        );
    }

    #[tokio::test]
    async fn protocol_errors_become_host_errors() {
        let error = invoker().call_tool("forecast", Map::new()).await.expect_err("unknown tool");
        assert!(matches!(error, HostError::ToolCall { ref tool_name, .. } if tool_name == "forecast"));
    }
}
