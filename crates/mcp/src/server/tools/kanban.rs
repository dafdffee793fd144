//! Board display tool handler.

use rmcp::model::{CallToolResult, Content, ErrorData};
use serde_json::Value;
use skydeck_types::{Task, TaskBoard, seed_tasks};
use tracing::{debug, warn};

use crate::server::schemas::KanbanBoardRequest;

pub const KANBAN_TOOL_NAME: &str = "kanban-board";
pub const KANBAN_TEMPLATE_URI: &str = "ui://widget/kanban-board.html";
pub const KANBAN_CONFIRMATION: &str = "Displayed the kanban board!";

/// Where the displayed tasks came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardSource {
    Provided,
    Seed,
    SeedAfterInvalidInput { reason: String },
}

/// Decode the optional `tasks` argument, falling back to the sample board.
///
/// Absent or blank input is a plain fallback. Input that is not a JSON array
/// of tasks is logged and then falls back as well.
pub fn board_from_input(tasks: Option<&str>) -> (Vec<Task>, BoardSource) {
    let Some(raw) = tasks.filter(|raw| !raw.trim().is_empty()) else {
        return (seed_tasks(), BoardSource::Seed);
    };

    match parse_tasks(raw) {
        Ok(tasks) => (tasks, BoardSource::Provided),
        Err(reason) => {
            warn!(%reason, "invalid tasks input; showing the sample board");
            (seed_tasks(), BoardSource::SeedAfterInvalidInput { reason })
        }
    }
}

fn parse_tasks(raw: &str) -> Result<Vec<Task>, String> {
    let value: Value = serde_json::from_str(raw).map_err(|error| format!("tasks is not valid JSON: {error}"))?;
    if !value.is_array() {
        return Err("tasks must be a JSON array".to_string());
    }
    serde_json::from_value(value).map_err(|error| format!("tasks do not match the task shape: {error}"))
}

/// Run the board tool: a fixed confirmation plus `{tasks}` as structured content.
pub fn kanban_board(request: &KanbanBoardRequest) -> Result<CallToolResult, ErrorData> {
    let (tasks, source) = board_from_input(request.tasks.as_deref());
    debug!(task_count = tasks.len(), ?source, "rendering kanban board");

    let structured = serde_json::to_value(TaskBoard { tasks })
        .map_err(|error| ErrorData::internal_error(format!("failed to encode tasks: {error}"), None))?;
    let mut result = CallToolResult::success(vec![Content::text(KANBAN_CONFIRMATION)]);
    result.structured_content = Some(structured);
    Ok(result)
}
