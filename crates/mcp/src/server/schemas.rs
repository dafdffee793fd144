use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the current-weather lookup.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct WeatherRequest {
    /// Latitude in decimal degrees.
    #[schemars(description = "Latitude for the weather lookup", range(min = -90.0, max = 90.0))]
    pub lat: f64,
    /// Longitude in decimal degrees.
    #[schemars(description = "Longitude for the weather lookup", range(min = -180.0, max = 180.0))]
    pub lon: f64,
}

/// Parameters for the board display tool.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct KanbanBoardRequest {
    /// Task list encoded as a JSON string. Absent or invalid input shows the
    /// sample board.
    #[schemars(description = "JSON string of tasks to display")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<String>,
}
