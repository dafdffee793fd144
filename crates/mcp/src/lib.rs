//! Model Context Protocol (MCP) tool server for the Skydeck widgets.
//!
//! This crate exposes two tools, `get_weather` and `kanban-board`, together
//! with the HTML templates the host renders for their output. It covers
//! configuration loading, the OpenWeatherMap client, the rmcp server handler,
//! and the axum host that serves `/mcp` plus the widget assets.

pub mod config;
pub mod provider;
pub mod server;
pub mod types;

pub use config::{ConfigError, OpenWeatherConfig, ServerConfig, WidgetConfig, load_config};
pub use provider::{OpenWeatherClient, WeatherProvider};
pub use server::{LocalToolInvoker, McpHttpLogEntry, McpHttpServer, McpToolServices, RunningMcpHttpServer, SkydeckMcpCore};
pub use types::WeatherToolError;
