//! `get_weather` tool handler.

use rmcp::model::{CallToolResult, Content, ErrorData};
use serde_json::json;
use skydeck_types::Coordinates;
use tracing::{info, warn};

use crate::provider::WeatherProvider;
use crate::server::schemas::WeatherRequest;

pub const WEATHER_TOOL_NAME: &str = "get_weather";
pub const WEATHER_TEMPLATE_URI: &str = "ui://widget/weather-forecast";

/// Reject coordinates outside their ranges before any provider call.
pub fn validate_coordinates(request: &WeatherRequest) -> Result<Coordinates, ErrorData> {
    check_range("lat", request.lat, 90.0)?;
    check_range("lon", request.lon, 180.0)?;
    Ok(Coordinates {
        lat: request.lat,
        lon: request.lon,
    })
}

fn check_range(field: &str, value: f64, limit: f64) -> Result<(), ErrorData> {
    if value.is_finite() && (-limit..=limit).contains(&value) {
        return Ok(());
    }
    Err(ErrorData::invalid_params(
        format!("{field} must be a number between -{limit} and {limit}"),
        Some(json!({ "field": field, "value": value.to_string(), "min": -limit, "max": limit })),
    ))
}

/// Run the lookup. Provider and configuration failures become tool-error
/// results; only invalid input is a protocol error.
pub async fn current_weather(provider: &dyn WeatherProvider, request: WeatherRequest) -> Result<CallToolResult, ErrorData> {
    let coordinates = validate_coordinates(&request)?;
    match provider.current_weather(coordinates).await {
        Ok(observation) => {
            info!(location = %observation.location, "weather lookup succeeded");
            let structured = serde_json::to_value(&observation)
                .map_err(|error| ErrorData::internal_error(format!("failed to encode observation: {error}"), None))?;
            Ok(CallToolResult::structured(structured))
        }
        Err(error) => {
            warn!(%error, lat = coordinates.lat, lon = coordinates.lon, "weather lookup failed");
            Ok(CallToolResult::error(vec![Content::text(error.to_string())]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::local::tool_result_from_call;
    use crate::types::WeatherToolError;
    use async_trait::async_trait;
    use rmcp::model::ErrorCode;
    use skydeck_types::{Reading, WeatherObservation};
    use std::sync::Mutex;

    struct StubProvider {
        outcome: Result<WeatherObservation, WeatherToolError>,
        calls: Mutex<Vec<Coordinates>>,
    }

    impl StubProvider {
        fn new(outcome: Result<WeatherObservation, WeatherToolError>) -> Self {
            Self {
                outcome,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn current_weather(&self, coordinates: Coordinates) -> Result<WeatherObservation, WeatherToolError> {
            self.calls.lock().unwrap().push(coordinates);
            self.outcome.clone()
        }
    }

    fn observation() -> WeatherObservation {
        WeatherObservation {
            location: "Paris".into(),
            coordinates: Coordinates { lat: 48.8566, lon: 2.3522 },
            description: "overcast clouds".into(),
            temperature_c: Reading::new(11.0),
            temperature_f: Reading::new(51.8),
            humidity: Reading::new(80.0),
            wind_kph: Reading::UNAVAILABLE,
            observed_at: "2025-10-19T08:00:00.000Z".into(),
            source: "openweathermap".into(),
        }
    }

    #[test]
    fn coordinates_outside_ranges_are_invalid_params() {
        for (lat, lon) in [(90.5, 0.0), (-91.0, 0.0), (0.0, 180.01), (0.0, -200.0), (f64::NAN, 0.0), (0.0, f64::INFINITY)] {
            let error = validate_coordinates(&WeatherRequest { lat, lon }).expect_err("out of range");
            assert_eq!(error.code, ErrorCode::INVALID_PARAMS);
        }
        assert!(validate_coordinates(&WeatherRequest { lat: 90.0, lon: -180.0 }).is_ok());
    }

    #[tokio::test]
    async fn success_returns_text_and_structured_forms() {
        let provider = StubProvider::new(Ok(observation()));
        let result = current_weather(&provider, WeatherRequest { lat: 48.8566, lon: 2.3522 })
            .await
            .expect("tool result");
        let result = tool_result_from_call(&result).expect("converts");

        assert!(!result.is_error());
        let structured = result.structured_content.clone().expect("structured content");
        assert_eq!(structured["location"], "Paris");
        assert_eq!(structured["windKph"], serde_json::Value::Null);
        let text: serde_json::Value = serde_json::from_str(result.first_text().expect("text item")).expect("text is json");
        assert_eq!(text, structured);
    }

    #[tokio::test]
    async fn provider_failure_is_a_tool_error() {
        let provider = StubProvider::new(Err(WeatherToolError::provider(Some(404), "city not found")));
        let result = current_weather(&provider, WeatherRequest { lat: 0.0, lon: 0.0 })
            .await
            .expect("tool result");
        let result = tool_result_from_call(&result).expect("converts");

        assert!(result.is_error());
        assert_eq!(result.first_text(), Some("OpenWeatherMap error (404): city not found"));
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_provider() {
        let provider = StubProvider::new(Ok(observation()));
        let outcome = current_weather(&provider, WeatherRequest { lat: 123.0, lon: 0.0 }).await;
        assert!(outcome.is_err());
        assert!(provider.calls.lock().unwrap().is_empty());
    }
}
