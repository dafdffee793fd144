use crate::config::{ServerConfig, WidgetConfig};
use crate::provider::{OpenWeatherClient, WeatherProvider};
use crate::server::http::McpHttpLogEntry;
use crate::server::log_payload::{parsed_text_payload, tool_log_payload};
use crate::server::resources::{list_resources, read_resource};
use crate::server::schemas::{KanbanBoardRequest, WeatherRequest};
use crate::server::tools::{KANBAN_TEMPLATE_URI, KANBAN_TOOL_NAME, WEATHER_TEMPLATE_URI, WEATHER_TOOL_NAME, current_weather, kanban_board};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, ErrorData, ErrorData as McpError, Implementation, JsonObject, ListResourcesResult, Meta, PaginatedRequestParams,
    ProtocolVersion, ReadResourceRequestParams, ReadResourceResult, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::{ServerHandler, service::RequestContext, tool, tool_handler, tool_router};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use skydeck_types::WeatherObservation;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

/// Shared services for MCP tool handlers.
pub struct McpToolServices {
    provider: Arc<dyn WeatherProvider>,
    widget: WidgetConfig,
}

impl McpToolServices {
    pub fn new(provider: Arc<dyn WeatherProvider>, widget: WidgetConfig) -> Self {
        Self { provider, widget }
    }

    /// Services backed by the OpenWeatherMap client described in `config`.
    ///
    /// A missing API key is not fatal here; `get_weather` reports it per call.
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        if config.openweather.api_key().is_none() {
            warn!("OWM_API_KEY is not set; get_weather calls will fail until it is configured");
        }
        let client = OpenWeatherClient::new(config.openweather.clone())?;
        Ok(Self::new(Arc::new(client), config.widget.clone()))
    }

    pub fn widget(&self) -> &WidgetConfig {
        &self.widget
    }
}

impl fmt::Debug for McpToolServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("McpToolServices").field("widget", &self.widget).finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct SkydeckMcpCore {
    tool_router: ToolRouter<Self>,
    log_sender: Option<UnboundedSender<McpHttpLogEntry>>,
    services: Arc<McpToolServices>,
}

#[tool_router]
impl SkydeckMcpCore {
    /// Create a new MCP core handler with shared service dependencies.
    pub fn new(log_sender: Option<UnboundedSender<McpHttpLogEntry>>, services: Arc<McpToolServices>) -> Self {
        Self {
            tool_router: decorate_tools(Self::tool_router()),
            log_sender,
            services,
        }
    }

    #[tool(
        name = "get_weather",
        annotations(read_only_hint = true, open_world_hint = true),
        description = "Fetches current weather conditions using OpenWeatherMap."
    )]
    async fn get_weather(&self, param: Parameters<WeatherRequest>) -> Result<CallToolResult, ErrorData> {
        let response = current_weather(self.services.provider.as_ref(), param.0).await;
        self.emit_log(
            WEATHER_TOOL_NAME,
            Some(serde_json::to_value(param.0).unwrap_or(Value::Null)),
            Some(log_value(&response)),
        );
        response
    }

    #[tool(
        name = "kanban-board",
        annotations(read_only_hint = true),
        description = "Display an interactive Kanban board"
    )]
    async fn kanban_board(&self, param: Parameters<KanbanBoardRequest>) -> Result<CallToolResult, ErrorData> {
        let response = kanban_board(&param.0);
        self.emit_log(
            KANBAN_TOOL_NAME,
            Some(serde_json::to_value(&param.0).unwrap_or(Value::Null)),
            Some(log_value(&response)),
        );
        response
    }

    /// Tool definitions as advertised by `tools/list`.
    pub fn tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    /// Invoke a tool in-process with raw JSON arguments.
    pub async fn invoke(&self, name: &str, arguments: Map<String, Value>) -> Result<CallToolResult, ErrorData> {
        match name {
            WEATHER_TOOL_NAME => self.get_weather(Parameters(decode_arguments(name, arguments)?)).await,
            KANBAN_TOOL_NAME => self.kanban_board(Parameters(decode_arguments(name, arguments)?)).await,
            _ => Err(ErrorData::invalid_params(
                format!("tool '{name}' not found"),
                Some(json!({ "available_tools": [WEATHER_TOOL_NAME, KANBAN_TOOL_NAME] })),
            )),
        }
    }

    fn emit_log(&self, tool_name: &str, request: Option<Value>, response: Option<Value>) {
        let Some(sender) = self.log_sender.as_ref() else {
            return;
        };
        let parsed_payload = parsed_text_payload(request.as_ref(), response.as_ref());
        let payload = tool_log_payload(request.as_ref(), response.as_ref());
        let _ = sender.send(McpHttpLogEntry::new(format!("MCP tool: {tool_name}"), payload));

        if let Some(parsed_payload) = parsed_payload {
            let parsed_message = format!("MCP tool: {tool_name} (parsed text content)");
            let _ = sender.send(McpHttpLogEntry::new(parsed_message, Some(parsed_payload)));
        }
    }
}

fn log_value(response: &Result<CallToolResult, ErrorData>) -> Value {
    match response {
        Ok(result) => serde_json::to_value(result).unwrap_or(Value::Null),
        Err(error) => json!({ "error": serde_json::to_value(error).unwrap_or(Value::Null) }),
    }
}

fn decode_arguments<T: DeserializeOwned>(tool_name: &str, arguments: Map<String, Value>) -> Result<T, ErrorData> {
    serde_json::from_value(Value::Object(arguments)).map_err(|error| {
        ErrorData::invalid_params(
            format!("invalid arguments for {tool_name}: {error}"),
            Some(json!({ "tool": tool_name })),
        )
    })
}

/// Attach the host-facing metadata the `#[tool]` attribute cannot express:
/// titles, output templates, invocation status text and the output schema.
fn decorate_tools(mut router: ToolRouter<SkydeckMcpCore>) -> ToolRouter<SkydeckMcpCore> {
    if let Some(route) = router.map.get_mut(WEATHER_TOOL_NAME) {
        route.attr.title = Some("Current Weather by Coordinates".to_string());
        route.attr.meta = Some(Meta(template_meta(WEATHER_TEMPLATE_URI, None)));
        route.attr.output_schema = observation_output_schema();
    }
    if let Some(route) = router.map.get_mut(KANBAN_TOOL_NAME) {
        route.attr.title = Some("Show Kanban Board".to_string());
        route.attr.meta = Some(Meta(template_meta(
            KANBAN_TEMPLATE_URI,
            Some(("Displaying the board", "Displayed the board")),
        )));
    }
    router
}

fn template_meta(template_uri: &str, invocation: Option<(&str, &str)>) -> JsonObject {
    let mut meta = JsonObject::new();
    meta.insert("openai/outputTemplate".to_string(), json!(template_uri));
    if let Some((invoking, invoked)) = invocation {
        meta.insert("openai/toolInvocation/invoking".to_string(), json!(invoking));
        meta.insert("openai/toolInvocation/invoked".to_string(), json!(invoked));
    }
    meta
}

fn observation_output_schema() -> Option<Arc<JsonObject>> {
    match serde_json::to_value(schemars::schema_for!(WeatherObservation)) {
        Ok(Value::Object(schema)) => Some(Arc::new(schema)),
        Ok(_) => None,
        Err(error) => {
            warn!(%error, "failed to build the weather output schema");
            None
        }
    }
}

#[tool_handler]
impl ServerHandler for SkydeckMcpCore {
    fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        std::future::ready(Ok(list_resources(&self.services.widget)))
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        std::future::ready(read_resource(&request.uri, &self.services.widget))
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().enable_resources().build(),
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: "skydeck".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Skydeck widgets".to_string()),
                ..Default::default()
            },
            instructions: Some(
                "Call get_weather with lat/lon to show current conditions in the weather widget (ui://widget/weather-forecast). Call kanban-board, optionally with `tasks` as a JSON string of tasks, to show the board widget (ui://widget/kanban-board.html).".to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenWeatherConfig;
    use crate::server::local::tool_result_from_call;
    use rmcp::model::ErrorCode;
    use tokio::sync::mpsc::unbounded_channel;

    fn core(log_sender: Option<UnboundedSender<McpHttpLogEntry>>) -> SkydeckMcpCore {
        let client = OpenWeatherClient::new(OpenWeatherConfig::default()).expect("client");
        let services = McpToolServices::new(Arc::new(client), WidgetConfig::default());
        SkydeckMcpCore::new(log_sender, Arc::new(services))
    }

    fn tool(core: &SkydeckMcpCore, name: &str) -> Tool {
        core.tools().into_iter().find(|tool| tool.name == name).expect("tool is listed")
    }

    #[test]
    fn tools_carry_titles_templates_and_schemas() {
        let core = core(None);

        let weather = tool(&core, "get_weather");
        assert_eq!(weather.title.as_deref(), Some("Current Weather by Coordinates"));
        let meta = weather.meta.expect("weather meta");
        assert_eq!(meta.0["openai/outputTemplate"], json!("ui://widget/weather-forecast"));
        let output_schema = weather.output_schema.expect("output schema");
        assert!(output_schema["properties"].get("temperatureC").is_some());
        assert!(weather.input_schema["properties"].get("lat").is_some());

        let board = tool(&core, "kanban-board");
        assert_eq!(board.title.as_deref(), Some("Show Kanban Board"));
        let meta = board.meta.expect("board meta");
        assert_eq!(meta.0["openai/outputTemplate"], json!("ui://widget/kanban-board.html"));
        assert_eq!(meta.0["openai/toolInvocation/invoking"], json!("Displaying the board"));
        assert_eq!(meta.0["openai/toolInvocation/invoked"], json!("Displayed the board"));
    }

    #[tokio::test]
    async fn missing_api_key_is_reported_as_a_tool_error() {
        let core = core(None);
        let mut arguments = Map::new();
        arguments.insert("lat".into(), json!(37.7749));
        arguments.insert("lon".into(), json!(-122.4194));

        let result = core.invoke("get_weather", arguments).await.expect("tool result");
        let result = tool_result_from_call(&result).expect("converts");
        assert!(result.is_error());
        assert_eq!(result.first_text(), Some("OWM_API_KEY is not configured on the server."));
    }

    #[tokio::test]
    async fn malformed_arguments_and_unknown_tools_are_invalid_params() {
        let core = core(None);
        let mut arguments = Map::new();
        arguments.insert("lat".into(), json!("north"));
        let error = core.invoke("get_weather", arguments).await.expect_err("bad arguments");
        assert_eq!(error.code, ErrorCode::INVALID_PARAMS);

        let error = core.invoke("forecast", Map::new()).await.expect_err("unknown tool");
        assert_eq!(error.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn tool_calls_are_streamed_to_the_log_channel() {
        let (sender, mut receiver) = unbounded_channel();
        let core = core(Some(sender));

        core.invoke("kanban-board", Map::new()).await.expect("tool result");

        let entry = receiver.try_recv().expect("log entry");
        assert_eq!(entry.message, "MCP tool: kanban-board");
        let payload = entry.payload.expect("payload");
        assert_eq!(payload["response"]["content"][0]["text"], json!("Displayed the kanban board!"));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn server_info_names_the_server() {
        let info = core(None).get_info();
        assert_eq!(info.server_info.name, "skydeck");
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
    }
}
