use html_escape::{encode_double_quoted_attribute, encode_text};
use skydeck_types::{Task, TaskStatus};
use skydeck_util::format_date_mmddyyyy;

const BOARD_TITLE: &str = "Kanban Board";
const UNSCHEDULED: &str = "Date TBD";

pub fn format_due_date(due_date: &str) -> String {
    if due_date.trim().is_empty() {
        return UNSCHEDULED.to_string();
    }
    format_date_mmddyyyy(due_date).unwrap_or_else(|| UNSCHEDULED.to_string())
}

/// One task card with its permitted move targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub assignee: String,
    pub priority_class: &'static str,
    pub priority_badge: String,
    pub due_label: String,
    pub move_back: Option<TaskStatus>,
    pub move_forward: Option<TaskStatus>,
}

impl CardView {
    fn new(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            assignee: task.assignee.clone(),
            priority_class: task.priority.as_str(),
            priority_badge: task.priority.as_str().to_uppercase(),
            due_label: format!("Due {}", format_due_date(&task.due_date)),
            move_back: task.status.previous(),
            move_forward: task.status.next(),
        }
    }

    fn to_html(&self) -> String {
        let id = encode_double_quoted_attribute(&self.id);
        let mut actions = String::new();
        if let Some(target) = self.move_back {
            actions.push_str(&format!(
                r#"<button type="button" class="btn-move" aria-label="Move task backward" data-task="{id}" data-target="{}">&lt;</button>"#,
                target.as_str()
            ));
        }
        if let Some(target) = self.move_forward {
            actions.push_str(&format!(
                r#"<button type="button" class="btn-move" aria-label="Move task forward" data-task="{id}" data-target="{}">&gt;</button>"#,
                target.as_str()
            ));
        }

        format!(
            r#"<div class="task-card" data-task-id="{id}">
  <div class="task-meta"><span class="task-badge priority-{}">{}</span><span class="task-assignee">{}</span></div>
  <div class="task-content"><div class="task-title">{}</div><div class="task-description">{}</div></div>
  <div class="task-footer"><span class="task-due">{}</span><div class="task-actions">{actions}</div></div>
</div>"#,
            self.priority_class,
            self.priority_badge,
            encode_text(&self.assignee),
            encode_text(&self.title),
            encode_text(&self.description),
            encode_text(&self.due_label),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub status: TaskStatus,
    pub title: &'static str,
    pub count: usize,
    pub cards: Vec<CardView>,
}

/// Tasks partitioned into the three status columns, in board order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub columns: Vec<ColumnView>,
}

impl BoardView {
    pub fn new(tasks: &[Task]) -> Self {
        let columns = TaskStatus::ALL
            .iter()
            .map(|&status| {
                let cards: Vec<CardView> = tasks.iter().filter(|task| task.status == status).map(CardView::new).collect();
                ColumnView {
                    status,
                    title: status.title(),
                    count: cards.len(),
                    cards,
                }
            })
            .collect();
        Self { columns }
    }

    pub fn column(&self, status: TaskStatus) -> Option<&ColumnView> {
        self.columns.iter().find(|column| column.status == status)
    }

    /// Board markup; `draft` renders the inline add form in its column.
    pub fn to_html(&self, draft: &AddTaskDraft) -> String {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let cards = column.cards.iter().map(CardView::to_html).collect::<Vec<_>>().join("\n");
                let add = match draft.open_column() {
                    Some(status) if status == column.status => format!(
                        r#"<div class="add-task-form"><input type="text" placeholder="Task title..." value="{}" autofocus /><div class="form-actions"><button type="button" class="btn-add">Add</button><button type="button" class="btn-cancel">Cancel</button></div></div>"#,
                        encode_double_quoted_attribute(draft.title())
                    ),
                    _ => format!(
                        r#"<button type="button" class="btn-new-task" data-column="{}">+ Add Task</button>"#,
                        column.status.as_str()
                    ),
                };
                format!(
                    r#"<div class="column" data-status="{}">
<div class="column-header"><h2>{}</h2><span class="task-count">{}</span></div>
<div class="tasks-container">
{cards}
</div>
{add}
</div>"#,
                    column.status.as_str(),
                    column.title,
                    column.count,
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<div class="kanban-board">
<h1 class="board-title">{BOARD_TITLE}</h1>
<div class="columns-container">
{columns}
</div>
</div>"#
        )
    }
}

/// State of the per-column inline "add task" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddTaskDraft {
    column: Option<TaskStatus>,
    title: String,
}

impl AddTaskDraft {
    pub fn open(&mut self, status: TaskStatus) {
        self.column = Some(status);
    }

    pub fn cancel(&mut self) {
        self.column = None;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn open_column(&self) -> Option<TaskStatus> {
        self.column
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Take the title and target column when the title is not blank, closing
    /// and clearing the form. Blank titles leave the form as it was.
    pub fn submit(&mut self) -> Option<(String, TaskStatus)> {
        let status = self.column?;
        if self.title.trim().is_empty() {
            return None;
        }
        self.column = None;
        Some((std::mem::take(&mut self.title), status))
    }
}
