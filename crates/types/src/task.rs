//! Kanban task model and the built-in seed board.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Workflow state of a task. The variants are also the board's columns, in
/// display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// All columns in display order.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }

    /// Column heading shown on the board.
    pub fn title(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    /// The column to the left, if any.
    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Todo => None,
            Self::InProgress => Some(Self::Todo),
            Self::Done => Some(Self::InProgress),
        }
    }

    /// The column to the right, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Todo => Some(Self::InProgress),
            Self::InProgress => Some(Self::Done),
            Self::Done => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Self::Todo),
            "in-progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(ParseTaskStatusError),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseTaskStatusError;

impl fmt::Display for ParseTaskStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid task status; expected 'todo', 'in-progress' or 'done'")
    }
}

impl Error for ParseTaskStatusError {}

/// Task priority. Unknown or missing labels read as [`TaskPriority::Medium`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }
}

impl<'de> Deserialize<'de> for TaskPriority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.map(|label| Self::from_label(&label)).unwrap_or_default())
    }
}

/// A single card on the board.
///
/// Only `id`, `title` and `status` are required on input; model-supplied
/// boards often leave out the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier, unique within a board.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_assignee")]
    pub assignee: String,
    #[serde(default)]
    pub priority: TaskPriority,
    /// Calendar date (`YYYY-MM-DD`); empty when unscheduled.
    #[serde(default)]
    pub due_date: String,
    pub status: TaskStatus,
}

fn default_assignee() -> String {
    "Unassigned".to_string()
}

/// Structured output of the board tool.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct TaskBoard {
    pub tasks: Vec<Task>,
}

/// The built-in board shown when neither the tool nor the host supplies tasks.
pub fn seed_tasks() -> Vec<Task> {
    const SEED: [(&str, &str, &str, &str, TaskPriority, &str, TaskStatus); 8] = [
        (
            "task-101",
            "Design dashboard wireframes",
            "Create responsive wireframes for the analytics dashboard.",
            "Sasha",
            TaskPriority::High,
            "2025-10-28",
            TaskStatus::Todo,
        ),
        (
            "task-102",
            "Prepare stakeholder brief",
            "Summarize project goals for the Thursday status meeting.",
            "Lee",
            TaskPriority::Medium,
            "2025-10-23",
            TaskStatus::Todo,
        ),
        (
            "task-201",
            "Set up CI pipeline",
            "Configure GitHub Actions with lint and unit test steps.",
            "Jordan",
            TaskPriority::High,
            "2025-10-21",
            TaskStatus::InProgress,
        ),
        (
            "task-202",
            "Refine onboarding copy",
            "Tighten messaging for the multi-step onboarding flow.",
            "Avery",
            TaskPriority::Medium,
            "2025-10-25",
            TaskStatus::InProgress,
        ),
        (
            "task-203",
            "Accessibility review",
            "Audit color contrast and keyboard navigation on key pages.",
            "Sasha",
            TaskPriority::High,
            "2025-10-27",
            TaskStatus::InProgress,
        ),
        (
            "task-301",
            "Ship notification service",
            "Deploy the notification microservice to the staging cluster.",
            "Morgan",
            TaskPriority::High,
            "2025-10-19",
            TaskStatus::Done,
        ),
        (
            "task-302",
            "Close beta feedback loop",
            "Capture beta tester feedback and publish summary notes.",
            "Avery",
            TaskPriority::Medium,
            "2025-10-18",
            TaskStatus::Done,
        ),
        (
            "task-303",
            "Update product roadmap",
            "Refresh Q4 roadmap to include analytics backlog items.",
            "Lee",
            TaskPriority::Low,
            "2025-10-20",
            TaskStatus::Done,
        ),
    ];

    SEED.iter()
        .map(|(id, title, description, assignee, priority, due_date, status)| Task {
            id: (*id).to_string(),
            title: (*title).to_string(),
            description: (*description).to_string(),
            assignee: (*assignee).to_string(),
            priority: *priority,
            due_date: (*due_date).to_string(),
            status: *status,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_kebab_case_on_the_wire() {
        let value = serde_json::to_value(TaskStatus::InProgress).unwrap();
        assert_eq!(value, serde_json::json!("in-progress"));
        assert_eq!("in-progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert!("blocked".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn column_neighbours_stop_at_the_edges() {
        assert_eq!(TaskStatus::Todo.previous(), None);
        assert_eq!(TaskStatus::Done.next(), None);
        assert_eq!(TaskStatus::InProgress.next(), Some(TaskStatus::Done));
    }

    #[test]
    fn seed_board_has_unique_ids_in_every_column() {
        let tasks = seed_tasks();
        assert_eq!(tasks.len(), 8);
        let mut ids: Vec<&str> = tasks.iter().map(|task| task.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), tasks.len());
        for status in TaskStatus::ALL {
            assert!(tasks.iter().any(|task| task.status == status));
        }
    }

    #[test]
    fn task_uses_camel_case_keys() {
        let value = serde_json::to_value(&seed_tasks()[0]).unwrap();
        assert_eq!(value["dueDate"], "2025-10-28");
        assert_eq!(value["priority"], "high");
    }

    #[test]
    fn sparse_tasks_fill_in_defaults() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": "t-1",
            "title": "Triage inbox",
            "priority": "urgent",
            "status": "todo"
        }))
        .unwrap();
        assert_eq!(task.description, "");
        assert_eq!(task.assignee, "Unassigned");
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.due_date, "");

        let task: Task = serde_json::from_value(serde_json::json!({
            "id": "t-2",
            "title": "Ship",
            "priority": "HIGH",
            "priority_note": "ignored",
            "status": "done"
        }))
        .unwrap();
        assert_eq!(task.priority, TaskPriority::High);
    }

    #[test]
    fn tasks_without_a_status_are_rejected() {
        let parsed = serde_json::from_value::<Task>(serde_json::json!({ "id": "t-1", "title": "No column" }));
        assert!(parsed.is_err());
    }
}
