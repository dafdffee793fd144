//! OpenWeatherMap current-conditions client.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use skydeck_types::{Coordinates, Reading, WEATHER_SOURCE, WeatherObservation};
use skydeck_util::iso_timestamp_from_epoch;
use tracing::{debug, warn};

use super::WeatherProvider;
use crate::config::OpenWeatherConfig;
use crate::types::WeatherToolError;

const DESCRIPTION_FALLBACK: &str = "Weather description unavailable";
const UNREACHABLE_MESSAGE: &str = "Failed to reach OpenWeatherMap API.";
const METERS_PER_SECOND_TO_KPH: f64 = 3.6;

/// Thin wrapper around a `reqwest::Client` for the OpenWeatherMap
/// current-weather endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    http: Client,
    config: OpenWeatherConfig,
}

impl OpenWeatherClient {
    pub fn new(config: OpenWeatherConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!("skydeck/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/weather", self.config.base_url.trim_end_matches('/'))
    }

    async fn fetch_payload(&self, api_key: &str, coordinates: Coordinates) -> Result<CurrentWeatherPayload, WeatherToolError> {
        let url = self.endpoint();
        debug!(%url, lat = coordinates.lat, lon = coordinates.lon, "requesting current weather");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", coordinates.lat.to_string()),
                ("lon", coordinates.lon.to_string()),
                ("appid", api_key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        let parsed: Option<Value> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let message = parsed
                .as_ref()
                .and_then(|value| value.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
            return Err(WeatherToolError::provider(Some(status.as_u16()), message));
        }

        let payload = match parsed.map(serde_json::from_value::<CurrentWeatherPayload>) {
            Some(Ok(payload)) => payload,
            Some(Err(error)) => {
                warn!(%error, "unexpected current-weather payload shape");
                CurrentWeatherPayload::default()
            }
            None => {
                warn!("current-weather response was not JSON");
                CurrentWeatherPayload::default()
            }
        };
        Ok(payload)
    }
}

fn transport_error(error: reqwest::Error) -> WeatherToolError {
    let status = error.status().map(|status| status.as_u16());
    let message = error.without_url().to_string();
    let message = if message.trim().is_empty() {
        UNREACHABLE_MESSAGE.to_string()
    } else {
        message
    };
    WeatherToolError::provider(status, message)
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current_weather(&self, coordinates: Coordinates) -> Result<WeatherObservation, WeatherToolError> {
        let api_key = self.config.api_key().ok_or_else(WeatherToolError::missing_api_key)?;
        let payload = self.fetch_payload(api_key, coordinates).await?;
        Ok(normalize_observation(&payload, coordinates, Utc::now()))
    }
}

/// Subset of the provider's current-weather response that feeds the
/// observation. Every field is optional upstream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CurrentWeatherPayload {
    pub name: Option<String>,
    pub weather: Option<Vec<ConditionPayload>>,
    pub main: Option<MainPayload>,
    pub wind: Option<WindPayload>,
    pub dt: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConditionPayload {
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MainPayload {
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WindPayload {
    pub speed: Option<f64>,
}

/// Map a provider payload onto a [`WeatherObservation`].
///
/// Missing numbers become [`Reading::UNAVAILABLE`]. A zero wind speed and a
/// zero timestamp count as absent.
pub fn normalize_observation(payload: &CurrentWeatherPayload, coordinates: Coordinates, now: DateTime<Utc>) -> WeatherObservation {
    let location = payload
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{:.2}, {:.2}", coordinates.lat, coordinates.lon));

    let description = payload
        .weather
        .as_ref()
        .and_then(|conditions| conditions.first())
        .and_then(|condition| condition.description.clone())
        .unwrap_or_else(|| DESCRIPTION_FALLBACK.to_string());

    let main = payload.main.as_ref();
    let temperature_c = Reading::from_option(main.and_then(|main| main.temp)).round_to_tenth();
    let temperature_f = temperature_c.map(|celsius| celsius * 9.0 / 5.0 + 32.0).round_to_tenth();
    let humidity = Reading::from_option(main.and_then(|main| main.humidity));

    let wind_speed = payload
        .wind
        .as_ref()
        .and_then(|wind| wind.speed)
        .filter(|speed| *speed != 0.0 && !speed.is_nan());
    let wind_kph = Reading::from_option(wind_speed)
        .map(|speed| speed * METERS_PER_SECOND_TO_KPH)
        .round_to_tenth();

    let observed_at = payload
        .dt
        .filter(|epoch| *epoch != 0)
        .and_then(iso_timestamp_from_epoch)
        .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true));

    WeatherObservation {
        location,
        coordinates,
        description,
        temperature_c,
        temperature_f,
        humidity,
        wind_kph,
        observed_at,
        source: WEATHER_SOURCE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use httpmock::prelude::*;
    use serde_json::json;

    const SAN_FRANCISCO: Coordinates = Coordinates {
        lat: 37.7749,
        lon: -122.4194,
    };

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 19, 12, 0, 0).single().expect("valid timestamp")
    }

    fn client(base_url: String, api_key: Option<&str>) -> OpenWeatherClient {
        OpenWeatherClient::new(OpenWeatherConfig {
            api_key: api_key.map(str::to_string),
            base_url,
        })
        .expect("client")
    }

    fn payload(value: Value) -> CurrentWeatherPayload {
        serde_json::from_value(value).expect("payload deserializes")
    }

    #[test]
    fn full_payload_is_normalized() {
        let observation = normalize_observation(
            &payload(json!({
                "name": "San Francisco",
                "weather": [{ "description": "light fog" }],
                "main": { "temp": 14.26, "humidity": 88 },
                "wind": { "speed": 4.1 },
                "dt": 1_760_860_800
            })),
            SAN_FRANCISCO,
            fixed_now(),
        );

        assert_eq!(observation.location, "San Francisco");
        assert_eq!(observation.description, "light fog");
        assert_eq!(observation.temperature_c, Reading::new(14.3));
        assert_eq!(observation.temperature_f, Reading::new(57.7));
        assert_eq!(observation.humidity, Reading::new(88.0));
        assert_eq!(observation.wind_kph, Reading::new(14.8));
        assert_eq!(observation.observed_at, "2025-10-19T08:00:00.000Z");
        assert_eq!(observation.source, "openweathermap");
        assert_eq!(observation.coordinates, SAN_FRANCISCO);
    }

    #[test]
    fn missing_fields_become_sentinels_and_fallbacks() {
        let observation = normalize_observation(&payload(json!({})), SAN_FRANCISCO, fixed_now());

        assert_eq!(observation.location, "37.77, -122.42");
        assert_eq!(observation.description, "Weather description unavailable");
        assert!(!observation.temperature_c.is_available());
        assert!(!observation.temperature_f.is_available());
        assert!(!observation.humidity.is_available());
        assert!(!observation.wind_kph.is_available());
        assert_eq!(observation.observed_at, "2025-10-19T12:00:00.000Z");
    }

    #[test]
    fn zero_wind_empty_name_and_zero_timestamp_count_as_absent() {
        let observation = normalize_observation(
            &payload(json!({ "name": "", "wind": { "speed": 0 }, "dt": 0, "weather": [] })),
            Coordinates { lat: -33.8688, lon: 151.2093 },
            fixed_now(),
        );
        assert_eq!(observation.location, "-33.87, 151.21");
        assert!(!observation.wind_kph.is_available());
        assert_eq!(observation.observed_at, "2025-10-19T12:00:00.000Z");
        assert_eq!(observation.description, "Weather description unavailable");
    }

    #[test]
    fn fahrenheit_follows_rounded_celsius() {
        let freezing = normalize_observation(&payload(json!({ "main": { "temp": 0.0 } })), SAN_FRANCISCO, fixed_now());
        assert_eq!(freezing.temperature_f, Reading::new(32.0));

        let boiling = normalize_observation(&payload(json!({ "main": { "temp": 100.0 } })), SAN_FRANCISCO, fixed_now());
        assert_eq!(boiling.temperature_f, Reading::new(212.0));
    }

    #[test]
    fn sentinels_serialize_as_null() {
        let observation = normalize_observation(&payload(json!({})), SAN_FRANCISCO, fixed_now());
        let value = serde_json::to_value(&observation).expect("serializes");
        assert_eq!(value["temperatureC"], Value::Null);
        assert_eq!(value["windKph"], Value::Null);
        assert_eq!(value["source"], json!("openweathermap"));
    }

    #[tokio::test]
    async fn fetches_current_weather_with_metric_units() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/weather")
                .query_param("lat", "37.7749")
                .query_param("lon", "-122.4194")
                .query_param("appid", "test-key")
                .query_param("units", "metric");
            then.status(200).json_body(json!({
                "name": "San Francisco",
                "weather": [{ "description": "clear sky" }],
                "main": { "temp": 18.04, "humidity": 61 },
                "wind": { "speed": 2.5 },
                "dt": 1_760_860_800
            }));
        });

        let observation = client(server.base_url(), Some("test-key"))
            .current_weather(SAN_FRANCISCO)
            .await
            .expect("weather");

        mock.assert_calls(1);
        assert_eq!(observation.description, "clear sky");
        assert_eq!(observation.temperature_c, Reading::new(18.0));
        assert_eq!(observation.wind_kph, Reading::new(9.0));
    }

    #[tokio::test]
    async fn provider_message_is_used_for_error_statuses() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/weather");
            then.status(401).json_body(json!({ "cod": 401, "message": "Invalid API key." }));
        });

        let error = client(server.base_url(), Some("bad-key"))
            .current_weather(SAN_FRANCISCO)
            .await
            .expect_err("unauthorized");

        assert_eq!(error, WeatherToolError::provider(Some(401), "Invalid API key."));
        assert_eq!(error.to_string(), "OpenWeatherMap error (401): Invalid API key.");
    }

    #[tokio::test]
    async fn status_text_fallback_when_body_has_no_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/weather");
            then.status(503).body("upstream unavailable");
        });

        let error = client(server.base_url(), Some("key"))
            .current_weather(SAN_FRANCISCO)
            .await
            .expect_err("unavailable");

        assert_eq!(error.to_string(), "OpenWeatherMap error (503): Request failed with status code 503");
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/weather");
            then.status(200).json_body(json!({}));
        });

        let error = client(server.base_url(), None)
            .current_weather(SAN_FRANCISCO)
            .await
            .expect_err("missing key");

        assert_eq!(error, WeatherToolError::missing_api_key());
        mock.assert_calls(0);
    }

    #[tokio::test]
    async fn unreachable_provider_reports_unknown_status() {
        let error = client("http://127.0.0.1:1".to_string(), Some("key"))
            .current_weather(SAN_FRANCISCO)
            .await
            .expect_err("unreachable");

        assert!(matches!(error, WeatherToolError::Provider { status: None, .. }));
        assert!(error.to_string().starts_with("OpenWeatherMap error (unknown): "));
    }
}
