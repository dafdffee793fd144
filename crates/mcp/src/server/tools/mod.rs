//! Tool handlers, independent of the rmcp router so they can be exercised
//! directly.

mod kanban;
mod weather;

pub use kanban::{BoardSource, KANBAN_CONFIRMATION, KANBAN_TEMPLATE_URI, KANBAN_TOOL_NAME, board_from_input, kanban_board};
pub use weather::{WEATHER_TEMPLATE_URI, WEATHER_TOOL_NAME, current_weather, validate_coordinates};
