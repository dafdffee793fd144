//! HTTP host for the Skydeck MCP server and widget assets.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager};
use serde::Deserialize;
use serde_json::Value;
use skydeck_types::{DisplayMode, HostGlobals, Theme, ToolResult};
use skydeck_widget::layout::{fallback_height, resolve_max_height};
use skydeck_widget::render::{AddTaskDraft, BOARD_LOADER_SCRIPT, BoardView, WIDGET_LOADER_SCRIPT, WIDGET_STYLESHEET, render_weather_frame};
use skydeck_widget::{BoardSynchronizer, HostCapabilities, HostContext, LoadState, WeatherWidget, WidgetError, observation_from_result};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::server::board_frame::{BoardFrame, RenderBoardRequest, render_board_frame};
use crate::server::core::{McpToolServices, SkydeckMcpCore};
use crate::server::local::LocalToolInvoker;

/// Log entry emitted by the MCP core for each tool call.
#[derive(Debug, Clone)]
pub struct McpHttpLogEntry {
    /// Human-readable summary for list display.
    pub message: String,
    /// Optional structured payload for detail inspection.
    pub payload: Option<Value>,
}

impl McpHttpLogEntry {
    pub fn new(message: String, payload: Option<Value>) -> Self {
        Self { message, payload }
    }
}

/// Host configuration for an MCP HTTP server instance.
#[derive(Debug, Clone)]
pub struct McpHttpServer {
    bind_address: SocketAddr,
    log_sender: Option<UnboundedSender<McpHttpLogEntry>>,
    services: Arc<McpToolServices>,
}

impl McpHttpServer {
    pub fn new(bind_address: SocketAddr, services: Arc<McpToolServices>) -> Self {
        Self {
            bind_address,
            log_sender: None,
            services,
        }
    }

    /// Attach a log sender to stream tool request/response events to the caller.
    pub fn with_log_sender(mut self, log_sender: UnboundedSender<McpHttpLogEntry>) -> Self {
        self.log_sender = Some(log_sender);
        self
    }

    /// Bind the listener and serve until [`RunningMcpHttpServer::stop`].
    ///
    /// Each `/mcp` request gets a fresh handler; no session state is kept
    /// between requests.
    pub async fn start(self) -> Result<RunningMcpHttpServer> {
        let cancellation_token = CancellationToken::new();

        let log_sender = self.log_sender.clone();
        let services = Arc::clone(&self.services);
        let service: StreamableHttpService<SkydeckMcpCore, LocalSessionManager> = StreamableHttpService::new(
            move || Ok(SkydeckMcpCore::new(log_sender.clone(), Arc::clone(&services))),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                stateful_mode: false,
                sse_keep_alive: None,
                cancellation_token: cancellation_token.child_token(),
                ..Default::default()
            },
        );

        let preview_core = SkydeckMcpCore::new(None, Arc::clone(&self.services));
        let router = widget_routes(preview_core).nest_service("/mcp", service);

        let listener = tokio::net::TcpListener::bind(self.bind_address)
            .await
            .with_context(|| format!("failed to bind {}", self.bind_address))?;
        let bound_address = listener.local_addr()?;
        info!(address = %bound_address, "skydeck server listening; POST MCP messages to /mcp");

        let server_handle = tokio::spawn({
            let shutdown = cancellation_token.child_token();
            async move {
                if let Err(error) = axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        shutdown.cancelled().await;
                    })
                    .await
                {
                    error!(%error, "HTTP server terminated with an error");
                }
            }
        });

        Ok(RunningMcpHttpServer {
            bind_address: bound_address,
            cancellation_token,
            server_handle,
        })
    }
}

/// Runtime handle for a running MCP HTTP server.
#[derive(Debug)]
pub struct RunningMcpHttpServer {
    bind_address: SocketAddr,
    cancellation_token: CancellationToken,
    server_handle: JoinHandle<()>,
}

impl RunningMcpHttpServer {
    /// Return the bound socket address for the running server.
    pub fn bound_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Stop the server and wait for in-flight requests to drain.
    pub async fn stop(self) -> Result<()> {
        self.cancellation_token.cancel();
        self.server_handle
            .await
            .map_err(|error| anyhow!("HTTP server task failed: {error}"))?;
        info!("skydeck server stopped");
        Ok(())
    }
}

fn widget_routes(core: SkydeckMcpCore) -> Router {
    Router::new()
        .route("/", get(preview_page))
        .route("/widget.css", get(stylesheet))
        .route("/widget.js", get(loader_script))
        .route("/board.js", get(board_script))
        .route("/healthz", get(|| async { "ok" }))
        .route("/render/weather", post(render_weather))
        .route("/render/board", post(render_board))
        .with_state(core)
}

async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], WIDGET_STYLESHEET)
}

async fn loader_script() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], WIDGET_LOADER_SCRIPT)
}

async fn board_script() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], BOARD_LOADER_SCRIPT)
}

/// Both widgets rendered in-process, without a host.
async fn preview_page(State(core): State<SkydeckMcpCore>) -> Html<String> {
    let capabilities = HostCapabilities::default().with_tool_invoker(Arc::new(LocalToolInvoker::new(core)));
    let mut widget = WeatherWidget::new(capabilities);
    let weather = render_weather_frame(
        widget.load_if_idle().await,
        DisplayMode::Inline,
        fallback_height(DisplayMode::Inline),
        Theme::Light,
    );

    let board = BoardSynchronizer::mount(HostContext::new(HostGlobals::default()), None);
    let board = BoardView::new(board.tasks()).to_html(&AddTaskDraft::default());

    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\" />\n<title>Skydeck widgets</title>\n<link rel=\"stylesheet\" href=\"/widget.css\" />\n</head>\n<body>\n<section id=\"weather-root\">{weather}</section>\n<section id=\"kanban-root\">{board}</section>\n<script type=\"module\" src=\"/board.js\"></script>\n</body>\n</html>\n"
    ))
}

/// Load phase reported by the browser loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderPhase {
    Unavailable,
    Loading,
    Settled,
    Failed,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderWeatherRequest {
    pub phase: RenderPhase,
    #[serde(default)]
    pub result: Option<ToolResult>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub display_mode: DisplayMode,
    #[serde(default)]
    pub max_height: Option<u32>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub viewport_height: Option<u32>,
}

impl RenderWeatherRequest {
    fn load_state(&self) -> LoadState {
        match self.phase {
            RenderPhase::Unavailable => LoadState::settled(Err(WidgetError::HostUnavailable)),
            RenderPhase::Loading => LoadState::Loading,
            RenderPhase::Settled => match &self.result {
                Some(result) => LoadState::settled(observation_from_result(result)),
                None => LoadState::settled(Err(WidgetError::EmptyPayload)),
            },
            RenderPhase::Failed => {
                let message = self.message.clone().unwrap_or_else(|| "Weather tool call failed.".to_string());
                LoadState::settled(Err(WidgetError::ToolFailed(message)))
            }
        }
    }

    fn max_height(&self) -> u32 {
        let globals = HostGlobals {
            max_height: self.max_height,
            display_mode: self.display_mode,
            ..HostGlobals::default()
        };
        let viewport = self.viewport_height.unwrap_or_else(|| fallback_height(self.display_mode));
        resolve_max_height(&globals, None, viewport)
    }
}

async fn render_weather(Json(request): Json<RenderWeatherRequest>) -> Html<String> {
    Html(render_weather_frame(
        &request.load_state(),
        request.display_mode,
        request.max_height(),
        request.theme,
    ))
}

async fn render_board(Json(request): Json<RenderBoardRequest>) -> Json<BoardFrame> {
    Json(render_board_frame(request, chrono::Utc::now()).await)
}
