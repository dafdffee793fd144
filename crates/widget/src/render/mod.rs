//! Presentation layer: view models and HTML for the weather card and the board.
//!
//! Rendering is a pure function of the current data. All user-supplied text
//! is escaped.

mod board;
mod weather_card;

pub use board::{AddTaskDraft, BoardView, CardView, ColumnView, format_due_date};
pub use weather_card::{MISSING_VALUE, WeatherCardView, format_temperature, render_weather_frame};

use skydeck_types::Task;

/// Stylesheet shared by both widgets.
pub const WIDGET_STYLESHEET: &str = include_str!("../../assets/widget.css");

/// Browser loader for the weather widget shell.
pub const WIDGET_LOADER_SCRIPT: &str = include_str!("../../assets/widget.js");

/// Browser loader that makes the board interactive through `/render/board`.
pub const BOARD_LOADER_SCRIPT: &str = include_str!("../../assets/board.js");

/// Self-contained board fragment: mount point with the rendered board and
/// the stylesheet inlined.
pub fn render_board_fragment(tasks: &[Task]) -> String {
    let board = BoardView::new(tasks).to_html(&AddTaskDraft::default());
    format!("<div id=\"kanban-root\">\n{board}\n</div>\n<style>{WIDGET_STYLESHEET}</style>")
}

/// Board template for hosts: the fragment for first paint plus the inlined
/// loader, which reconciles against the host's tool output and widget state.
pub fn render_board_template(tasks: &[Task]) -> String {
    format!("{}\n<script type=\"module\">\n{BOARD_LOADER_SCRIPT}</script>", render_board_fragment(tasks))
}
