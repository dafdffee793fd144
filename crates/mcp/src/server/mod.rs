mod board_frame;
mod core;
mod http;
pub mod local;
mod log_payload;
pub mod resources;
pub mod schemas;
pub mod tools;

pub use board_frame::{BoardAction, BoardFrame, RenderBoardRequest, render_board_frame};
pub use core::{McpToolServices, SkydeckMcpCore};
pub use http::{McpHttpLogEntry, McpHttpServer, RenderPhase, RenderWeatherRequest, RunningMcpHttpServer};
pub use local::{LocalToolInvoker, tool_result_from_call};
