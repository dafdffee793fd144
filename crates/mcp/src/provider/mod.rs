//! Weather providers backing the `get_weather` tool.

mod openweather;

pub use openweather::{OpenWeatherClient, normalize_observation};

use async_trait::async_trait;
use skydeck_types::{Coordinates, WeatherObservation};

use crate::types::WeatherToolError;

/// Source of current conditions for a coordinate.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch and normalize the current conditions at `coordinates`.
    async fn current_weather(&self, coordinates: Coordinates) -> Result<WeatherObservation, WeatherToolError>;
}
