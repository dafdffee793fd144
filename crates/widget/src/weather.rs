//! Load state machine for the weather widget.

use serde_json::{Map, Value, json};
use skydeck_types::{Coordinates, ToolResult, WeatherObservation};
use thiserror::Error;
use tracing::{debug, warn};

use crate::bridge::{HostCapabilities, HostError};
use crate::extract::extract_payload;

/// Tool the weather widget invokes on mount.
pub const WEATHER_TOOL_NAME: &str = "get_weather";

/// San Francisco, the widget's fixed location.
pub const DEFAULT_COORDINATES: Coordinates = Coordinates {
    lat: 37.7749,
    lon: -122.4194,
};

/// Reasons a weather load ends in the error state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WidgetError {
    #[error("OpenAI Apps SDK not detected. Load this widget from an OpenAI app session.")]
    HostUnavailable,

    #[error("Weather tool returned an empty payload.")]
    EmptyPayload,

    #[error("{0}")]
    ToolFailed(String),

    #[error("{0}")]
    Host(#[from] HostError),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Success(WeatherObservation),
    Error(String),
}

impl LoadState {
    /// Terminal state for a finished load attempt.
    pub fn settled(outcome: Result<WeatherObservation, WidgetError>) -> Self {
        match outcome {
            Ok(observation) => {
                debug!(location = %observation.location, "weather loaded");
                Self::Success(observation)
            }
            Err(error) => {
                warn!(%error, "weather load failed");
                Self::Error(error.to_string())
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Error(_))
    }

    pub fn observation(&self) -> Option<&WeatherObservation> {
        match self {
            Self::Success(observation) => Some(observation),
            _ => None,
        }
    }
}

/// Interpret a `get_weather` result: tool errors surface their text, and a
/// result without a recognizable observation is an empty payload.
pub fn observation_from_result(result: &ToolResult) -> Result<WeatherObservation, WidgetError> {
    if result.is_error() {
        let message = result
            .first_text()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{WEATHER_TOOL_NAME} reported an error"));
        return Err(WidgetError::ToolFailed(message));
    }
    extract_payload::<WeatherObservation>(Some(result)).ok_or(WidgetError::EmptyPayload)
}

/// Weather widget bound to one host session.
#[derive(Debug)]
pub struct WeatherWidget {
    capabilities: HostCapabilities,
    coordinates: Coordinates,
    state: LoadState,
}

impl WeatherWidget {
    pub fn new(capabilities: HostCapabilities) -> Self {
        Self {
            capabilities,
            coordinates: DEFAULT_COORDINATES,
            state: LoadState::Idle,
        }
    }

    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = coordinates;
        self
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Run the mount-time load once. Later calls return the settled state.
    pub async fn load_if_idle(&mut self) -> &LoadState {
        if matches!(self.state, LoadState::Idle) {
            self.load().await;
        }
        &self.state
    }

    /// Call the weather tool and settle into success or error.
    pub async fn load(&mut self) -> &LoadState {
        self.state = LoadState::Loading;
        self.state = LoadState::settled(self.fetch().await);
        &self.state
    }

    async fn fetch(&self) -> Result<WeatherObservation, WidgetError> {
        let invoker = self.capabilities.tool_invoker.as_ref().ok_or(WidgetError::HostUnavailable)?;
        let result = invoker.call_tool(WEATHER_TOOL_NAME, self.arguments()).await?;
        observation_from_result(&result)
    }

    fn arguments(&self) -> Map<String, Value> {
        let mut arguments = Map::new();
        arguments.insert("lat".into(), json!(self.coordinates.lat));
        arguments.insert("lon".into(), json!(self.coordinates.lon));
        arguments
    }
}
