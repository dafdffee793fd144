//! Board frames for the browser loader.
//!
//! The loader keeps no board logic of its own. Each request carries the
//! host's tool output and widget state, the tasks currently on screen and one
//! user action; the board synchronizer applies it and the response carries
//! the new markup plus the merged state the loader hands to the host.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use skydeck_types::{GlobalKey, HostGlobals, Task, TaskStatus};
use skydeck_widget::render::{AddTaskDraft, BoardView};
use skydeck_widget::{BoardSynchronizer, HostContext, MemoryStateStore, WidgetStateStore};
use tracing::debug;

/// One user or host event on the board.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BoardAction {
    /// First render after the template loads.
    Mount,
    /// The host pushed a new value for `key`.
    HostUpdate { key: GlobalKey },
    #[serde(rename_all = "camelCase")]
    Move { task_id: String, status: TaskStatus },
    OpenForm { column: TaskStatus },
    CancelForm,
    Add { column: TaskStatus, title: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderBoardRequest {
    pub action: BoardAction,
    /// Tasks on screen; absent before the first render.
    #[serde(default)]
    pub tasks: Option<Vec<Task>>,
    #[serde(default)]
    pub tool_output: Option<Value>,
    #[serde(default)]
    pub widget_state: Option<Value>,
    /// Whether the host offers `setWidgetState`.
    #[serde(default)]
    pub can_persist: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardFrame {
    pub html: String,
    pub tasks: Vec<Task>,
    /// Whether the loader should swap in `html`.
    pub changed: bool,
    /// State to hand to the host after a mutation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget_state: Option<Value>,
}

/// Apply `request.action` to the board and render the result.
pub async fn render_board_frame(request: RenderBoardRequest, now: DateTime<Utc>) -> BoardFrame {
    let context = HostContext::new(HostGlobals {
        tool_output: request.tool_output,
        widget_state: request.widget_state,
        ..HostGlobals::default()
    });
    let recorder = request.can_persist.then(|| Arc::new(MemoryStateStore::new()));
    let state_store = recorder.clone().map(|store| store as Arc<dyn WidgetStateStore>);
    let mut board = match request.tasks {
        Some(tasks) => BoardSynchronizer::resume(context.clone(), state_store, tasks),
        None => BoardSynchronizer::mount(context.clone(), state_store),
    };

    let mut draft = AddTaskDraft::default();
    let mut pending = None;
    let changed = match request.action {
        BoardAction::Mount | BoardAction::CancelForm => true,
        BoardAction::HostUpdate { key } => board.apply_host_update(key, &context.snapshot()),
        BoardAction::Move { task_id, status } => {
            pending = Some(board.move_task(&task_id, status));
            true
        }
        BoardAction::OpenForm { column } => {
            draft.open(column);
            true
        }
        BoardAction::Add { column, title } => {
            draft.open(column);
            draft.set_title(title);
            if let Some((title, status)) = draft.submit() {
                pending = Some(board.add_task_at(&title, status, now));
            }
            true
        }
    };

    if let Some(pending) = pending {
        pending.settled().await;
    }
    let widget_state = recorder.and_then(|store| store.last_write());
    debug!(changed, persisted = widget_state.is_some(), task_count = board.tasks().len(), "board frame rendered");

    BoardFrame {
        html: BoardView::new(board.tasks()).to_html(&draft),
        tasks: board.tasks().to_vec(),
        changed,
        widget_state,
    }
}
