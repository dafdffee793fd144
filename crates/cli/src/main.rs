use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value, json};
use skydeck_mcp::config::{ServerConfig, load_config, resolve_bind_address};
use skydeck_mcp::server::tools::{KANBAN_TOOL_NAME, WEATHER_TOOL_NAME};
use skydeck_mcp::{LocalToolInvoker, McpHttpLogEntry, McpHttpServer, McpToolServices, SkydeckMcpCore};
use skydeck_types::TaskBoard;
use skydeck_util::redact_sensitive;
use skydeck_widget::render::render_board_fragment;
use skydeck_widget::{DEFAULT_COORDINATES, ToolInvoker, extract_payload, observation_from_result};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "skydeck", version, about = "Weather and kanban widgets served over MCP")]
struct Cli {
    /// Configuration file. Defaults to $SKYDECK_CONFIG_PATH or ~/.config/skydeck/server.json.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand, PartialEq)]
enum Command {
    /// Run the HTTP host (`/mcp` plus widget assets). This is the default.
    Serve {
        /// Socket address to listen on, overriding configuration.
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
    /// Call the weather tool once and print the normalized observation.
    Weather {
        #[arg(long, allow_negative_numbers = true, default_value_t = DEFAULT_COORDINATES.lat)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true, default_value_t = DEFAULT_COORDINATES.lon)]
        lon: f64,
    },
    /// Run the board tool and print the rendered board HTML.
    Board {
        /// Tasks as a JSON array string; the sample board is used otherwise.
        #[arg(long, value_name = "JSON")]
        tasks: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    init_tracing();
    if let Ok(path) = dotenv {
        debug!(path = %path.display(), "loaded .env file");
    }

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    debug!(config = %redact_sensitive(&format!("{config:?}")), "configuration resolved");

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => serve(config, bind).await,
        Command::Weather { lat, lon } => weather(&config, lat, lon).await,
        Command::Board { tasks } => board(&config, tasks).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn serve(mut config: ServerConfig, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.bind_address = bind;
    }
    let bind_address = resolve_bind_address(&config.bind_address, config.allow_remote_bind)?;
    let services = Arc::new(McpToolServices::from_config(&config)?);

    let (log_sender, log_receiver) = unbounded_channel::<McpHttpLogEntry>();
    let log_task = spawn_log_drain(log_receiver);

    let server = McpHttpServer::new(bind_address, services)
        .with_log_sender(log_sender)
        .start()
        .await?;
    info!("Weather MCP server listening on http://{}", server.bound_address());
    info!("POST MCP messages to http://{}/mcp", server.bound_address());

    tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
    info!("shutting down");
    server.stop().await?;
    log_task.abort();
    Ok(())
}

/// Forward MCP tool log entries to tracing until every sender is gone.
fn spawn_log_drain(mut log_receiver: UnboundedReceiver<McpHttpLogEntry>) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut drained = 0;
        while let Some(entry) = log_receiver.recv().await {
            let payload = entry.payload.map(|payload| payload.to_string()).unwrap_or_default();
            debug!(%payload, "{}", entry.message);
            drained += 1;
        }
        drained
    })
}

fn local_invoker(config: &ServerConfig) -> Result<LocalToolInvoker> {
    let services = McpToolServices::from_config(config)?;
    Ok(LocalToolInvoker::new(SkydeckMcpCore::new(None, Arc::new(services))))
}

async fn weather(config: &ServerConfig, lat: f64, lon: f64) -> Result<()> {
    let invoker = local_invoker(config)?;
    let mut arguments = Map::new();
    arguments.insert("lat".to_string(), json!(lat));
    arguments.insert("lon".to_string(), json!(lon));

    let result = invoker.call_tool(WEATHER_TOOL_NAME, arguments).await?;
    let observation = observation_from_result(&result)?;
    println!("{}", serde_json::to_string_pretty(&observation)?);
    Ok(())
}

async fn board(config: &ServerConfig, tasks: Option<String>) -> Result<()> {
    let invoker = local_invoker(config)?;
    let mut arguments = Map::new();
    if let Some(tasks) = tasks {
        arguments.insert("tasks".to_string(), Value::String(tasks));
    }

    let result = invoker.call_tool(KANBAN_TOOL_NAME, arguments).await?;
    let board: TaskBoard = extract_payload(Some(&result)).context("board tool returned no tasks")?;
    println!("{}", render_board_fragment(&board.tasks));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["skydeck"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn weather_defaults_to_the_widget_coordinates() {
        let cli = Cli::try_parse_from(["skydeck", "weather"]).expect("parses");
        assert_eq!(
            cli.command,
            Some(Command::Weather {
                lat: 37.7749,
                lon: -122.4194
            })
        );
    }

    #[test]
    fn negative_coordinates_and_global_config_parse() {
        let cli = Cli::try_parse_from(["skydeck", "weather", "--lat", "-33.87", "--lon", "151.21", "--config", "/tmp/s.json"])
            .expect("parses");
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.json")));
        assert_eq!(
            cli.command,
            Some(Command::Weather {
                lat: -33.87,
                lon: 151.21
            })
        );
    }

    #[tokio::test]
    async fn log_drain_runs_until_senders_drop() {
        let (sender, receiver) = unbounded_channel::<McpHttpLogEntry>();
        let drain = spawn_log_drain(receiver);
        sender
            .send(McpHttpLogEntry::new("MCP tool: get_weather".to_string(), Some(json!({ "lat": 1.0 }))))
            .expect("drain alive");
        sender
            .send(McpHttpLogEntry::new("(parsed text content)".to_string(), None))
            .expect("drain alive");
        drop(sender);
        assert_eq!(drain.await.expect("drain task"), 2);
    }

    #[test]
    fn serve_accepts_a_bind_override() {
        let cli = Cli::try_parse_from(["skydeck", "serve", "--bind", "127.0.0.1:8787"]).expect("parses");
        assert_eq!(
            cli.command,
            Some(Command::Serve {
                bind: Some("127.0.0.1:8787".to_string())
            })
        );
    }
}
