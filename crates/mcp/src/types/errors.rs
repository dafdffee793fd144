//! Error types for the Skydeck tool handlers.

use thiserror::Error;

/// Failure of the `get_weather` tool.
///
/// Both variants are reported to the caller as tool-error results, never as
/// protocol errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WeatherToolError {
    /// A required credential is missing. Fails fast and is never retried.
    #[error("{message}")]
    Configuration { message: String },

    /// The provider answered with a non-success status or could not be reached.
    #[error("OpenWeatherMap error ({}): {message}", status_label(.status))]
    Provider { status: Option<u16>, message: String },
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "unknown".to_string(), |code| code.to_string())
}

impl WeatherToolError {
    /// Create the error reported when no provider API key is configured.
    pub fn missing_api_key() -> Self {
        Self::Configuration {
            message: "OWM_API_KEY is not configured on the server.".to_string(),
        }
    }

    /// Create a provider error.
    pub fn provider(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Provider {
            status,
            message: message.into(),
        }
    }
}
