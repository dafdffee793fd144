//! Task-board state mirrored to the view and to the host's widget state.
//!
//! Every mutation goes through [`BoardSynchronizer::commit`]: the next list
//! is computed by a pure transform, the host write is scheduled in the
//! background (merged into whatever state object the host already holds),
//! and the local list is replaced regardless of how the write turns out.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use skydeck_types::{GlobalKey, HostGlobals, Task, TaskPriority, TaskStatus, seed_tasks};
use skydeck_util::due_date_after;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::bridge::WidgetStateStore;
use crate::context::HostContext;

/// Key under which the task list is stored in the host's widget state.
pub const TASKS_STATE_KEY: &str = "tasks";

const NEW_TASK_DESCRIPTION: &str = "Quick capture via inline add button.";
const NEW_TASK_ASSIGNEE: &str = "Unassigned";
const NEW_TASK_DUE_IN_DAYS: u64 = 7;

/// Replace the status of the task with `task_id`. Unknown ids leave the list
/// unchanged.
pub fn move_task(tasks: &[Task], task_id: &str, status: TaskStatus) -> Vec<Task> {
    tasks
        .iter()
        .map(|task| {
            if task.id == task_id {
                Task { status, ..task.clone() }
            } else {
                task.clone()
            }
        })
        .collect()
}

/// Append a freshly captured task with default metadata.
pub fn append_task(tasks: &[Task], id: String, title: &str, status: TaskStatus, today: NaiveDate) -> Vec<Task> {
    let mut next = tasks.to_vec();
    next.push(Task {
        id,
        title: title.to_string(),
        description: NEW_TASK_DESCRIPTION.to_string(),
        assignee: NEW_TASK_ASSIGNEE.to_string(),
        priority: TaskPriority::Medium,
        due_date: due_date_after(today, NEW_TASK_DUE_IN_DAYS),
        status,
    });
    next
}

/// Shallow-copy the host's current state object and set the task list on it.
///
/// Keys other than [`TASKS_STATE_KEY`] are carried over untouched. A missing
/// or non-object state starts from an empty object.
pub fn merge_widget_state(current: Option<&Value>, tasks: &[Task]) -> Value {
    let mut state = match current {
        Some(Value::Object(existing)) => existing.clone(),
        _ => Map::new(),
    };
    let encoded = tasks.iter().filter_map(|task| serde_json::to_value(task).ok()).collect();
    state.insert(TASKS_STATE_KEY.to_string(), Value::Array(encoded));
    Value::Object(state)
}

/// Read a task list from a tool output or widget state object.
///
/// The list may be an array or a JSON string encoding an array; anything else
/// counts as absent.
pub fn tasks_from_value(value: &Value) -> Option<Vec<Task>> {
    match value.get(TASKS_STATE_KEY)? {
        Value::Array(_) => decode_tasks(&value[TASKS_STATE_KEY]),
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(parsed) if parsed.is_array() => decode_tasks(&parsed),
            Ok(_) => {
                warn!("ignoring non-array tasks payload");
                None
            }
            Err(error) => {
                warn!(%error, "failed to parse tasks payload");
                None
            }
        },
        _ => None,
    }
}

fn decode_tasks(value: &Value) -> Option<Vec<Task>> {
    serde_json::from_value(value.clone())
        .map_err(|error| warn!(%error, "tasks payload does not match the task shape"))
        .ok()
}

/// Pick the initial task list: tool output, then persisted widget state,
/// then the built-in seed board.
pub fn reconcile_initial_tasks(tool_output: Option<&Value>, widget_state: Option<&Value>) -> Vec<Task> {
    tool_output
        .and_then(tasks_from_value)
        .or_else(|| widget_state.and_then(tasks_from_value))
        .unwrap_or_else(seed_tasks)
}

/// Mints `task-<millis>` identifiers that never repeat within a session.
///
/// Identifiers are strictly increasing even when the clock stalls or goes
/// backwards, and skip any value already present on the board.
#[derive(Debug, Default)]
pub struct TaskIdMinter {
    last: i64,
}

impl TaskIdMinter {
    pub fn mint(&mut self, now_millis: i64, existing: &[Task]) -> String {
        let mut candidate = now_millis.max(self.last.saturating_add(1));
        while existing.iter().any(|task| task.id == format!("task-{candidate}")) {
            candidate += 1;
        }
        self.last = candidate;
        format!("task-{candidate}")
    }
}

/// Handle to a background widget-state write.
///
/// Dropping it does not cancel the write.
#[derive(Debug)]
pub struct PendingWrite(Option<JoinHandle<()>>);

impl PendingWrite {
    fn none() -> Self {
        Self(None)
    }

    /// Whether a host write was issued for this mutation.
    pub fn is_scheduled(&self) -> bool {
        self.0.is_some()
    }

    /// Wait for the write to finish. Failures were already logged.
    pub async fn settled(self) {
        if let Some(handle) = self.0 {
            let _ = handle.await;
        }
    }
}

/// The board's task list plus its persistence wiring.
pub struct BoardSynchronizer {
    tasks: Vec<Task>,
    context: HostContext,
    state_store: Option<Arc<dyn WidgetStateStore>>,
    minter: TaskIdMinter,
}

impl BoardSynchronizer {
    /// Build the board from the host context's current snapshot.
    pub fn mount(context: HostContext, state_store: Option<Arc<dyn WidgetStateStore>>) -> Self {
        let tasks = context.read(|globals| reconcile_initial_tasks(globals.tool_output.as_ref(), globals.widget_state.as_ref()));
        debug!(task_count = tasks.len(), "board mounted");
        Self {
            tasks,
            context,
            state_store,
            minter: TaskIdMinter::default(),
        }
    }

    /// Pick up a board whose view already shows `tasks`, skipping the
    /// initial reconciliation.
    pub fn resume(context: HostContext, state_store: Option<Arc<dyn WidgetStateStore>>, tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            context,
            state_store,
            minter: TaskIdMinter::default(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn move_task(&mut self, task_id: &str, status: TaskStatus) -> PendingWrite {
        self.commit(|tasks| move_task(tasks, task_id, status))
    }

    pub fn add_task(&mut self, title: &str, status: TaskStatus) -> PendingWrite {
        self.add_task_at(title, status, Utc::now())
    }

    /// [`Self::add_task`] with an explicit clock reading.
    pub fn add_task_at(&mut self, title: &str, status: TaskStatus, now: DateTime<Utc>) -> PendingWrite {
        let id = self.minter.mint(now.timestamp_millis(), &self.tasks);
        let today = now.date_naive();
        self.commit(|tasks| append_task(tasks, id, title, status, today))
    }

    /// Apply a pure transform, schedule the host write, then update the view.
    pub fn commit(&mut self, transform: impl FnOnce(&[Task]) -> Vec<Task>) -> PendingWrite {
        let next = transform(&self.tasks);
        let pending = match &self.state_store {
            Some(store) => {
                let state = self
                    .context
                    .read(|globals| merge_widget_state(globals.widget_state.as_ref(), &next));
                spawn_write(Arc::clone(store), state)
            }
            None => PendingWrite::none(),
        };
        self.tasks = next;
        pending
    }

    /// Adopt tasks pushed by the host for `key`, when they differ from the
    /// current list. Returns whether the list changed.
    pub fn apply_host_update(&mut self, key: GlobalKey, globals: &HostGlobals) -> bool {
        let source = match key {
            GlobalKey::ToolOutput => globals.tool_output.as_ref(),
            GlobalKey::WidgetState => globals.widget_state.as_ref(),
            _ => return false,
        };
        let Some(tasks) = source.and_then(tasks_from_value) else {
            return false;
        };
        if serialized(&tasks) == serialized(&self.tasks) {
            return false;
        }
        debug!(?key, task_count = tasks.len(), "adopting host-pushed tasks");
        self.tasks = tasks;
        true
    }
}

fn serialized(tasks: &[Task]) -> String {
    serde_json::to_string(tasks).unwrap_or_default()
}

fn spawn_write(store: Arc<dyn WidgetStateStore>, state: Value) -> PendingWrite {
    let Ok(runtime) = Handle::try_current() else {
        warn!("no async runtime available; widget state not persisted");
        return PendingWrite::none();
    };
    PendingWrite(Some(runtime.spawn(async move {
        if let Err(error) = store.set_widget_state(state).await {
            warn!(%error, "failed to persist widget state");
        }
    })))
}
