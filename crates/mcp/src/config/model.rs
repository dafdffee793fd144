//! Data models for the Skydeck server configuration.

use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";
pub const DEFAULT_OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Server configuration, layered as defaults, then the JSON file, then the
/// environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ServerConfig {
    /// Socket address for the HTTP host (for example, "127.0.0.1:3000").
    pub bind_address: String,
    /// Permit binding to a non-loopback address.
    pub allow_remote_bind: bool,
    pub openweather: OpenWeatherConfig,
    pub widget: WidgetConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            allow_remote_bind: false,
            openweather: OpenWeatherConfig::default(),
            widget: WidgetConfig::default(),
        }
    }
}

/// Weather provider settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct OpenWeatherConfig {
    /// Provider credential. Absent keys are reported per tool call, not at startup.
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENWEATHER_BASE_URL.to_string(),
        }
    }
}

impl OpenWeatherConfig {
    /// The API key when it is present and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }
}

impl fmt::Debug for OpenWeatherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Host presentation settings advertised with the widget resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct WidgetConfig {
    /// Origin the host renders widgets under.
    pub domain: String,
    /// Origins the widget may call.
    pub connect_domains: Vec<String>,
    /// Origins the widget may load static assets from.
    pub resource_domains: Vec<String>,
    pub prefers_border: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            domain: "https://chatgpt.com".to_string(),
            connect_domains: vec!["https://chatgpt.com".to_string()],
            resource_domains: vec!["https://*.oaistatic.com".to_string()],
            prefers_border: true,
        }
    }
}

pub const API_KEY_ENV: &str = "OWM_API_KEY";
pub const BASE_URL_ENV: &str = "OWM_BASE_URL";
pub const PORT_ENV: &str = "PORT";
pub const BIND_ENV: &str = "SKYDECK_BIND";

impl ServerConfig {
    /// Apply environment overrides on top of the file and default layers.
    ///
    /// `SKYDECK_BIND` replaces the whole bind address; `PORT` then replaces
    /// only its port.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(api_key) = non_empty_var(API_KEY_ENV) {
            self.openweather.api_key = Some(api_key);
        }
        if let Some(base_url) = non_empty_var(BASE_URL_ENV) {
            self.openweather.base_url = base_url;
        }
        if let Some(bind_address) = non_empty_var(BIND_ENV) {
            self.bind_address = bind_address;
        }
        if let Some(port) = non_empty_var(PORT_ENV) {
            let port: u16 = port.parse().map_err(|_| ConfigError::Invalid {
                message: format!("{PORT_ENV} must be a port number, got '{port}'"),
            })?;
            self.bind_address = with_port(&self.bind_address, port);
        }
        Ok(())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn with_port(bind_address: &str, port: u16) -> String {
    let host = match bind_address.rsplit_once(':') {
        Some((host, _)) if !host.is_empty() => host,
        _ => "127.0.0.1",
    };
    format!("{host}:{port}")
}

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    Invalid { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_camel_case_config() {
        let json = r#"{
          "bindAddress": "127.0.0.1:8080",
          "openweather": { "apiKey": "abc123", "baseUrl": "http://localhost:9000" },
          "widget": { "prefersBorder": false }
        }"#;
        let config: ServerConfig = serde_json::from_str(json).expect("config deserializes");
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.openweather.api_key(), Some("abc123"));
        assert!(!config.widget.prefers_border);
        assert_eq!(config.widget.domain, "https://chatgpt.com");
        assert!(!config.allow_remote_bind);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = serde_json::from_str::<ServerConfig>(r#"{ "bindAdress": "127.0.0.1:1" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn debug_output_hides_the_api_key() {
        let config = OpenWeatherConfig {
            api_key: Some("super-secret".into()),
            ..OpenWeatherConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn blank_api_key_counts_as_absent() {
        let config = OpenWeatherConfig {
            api_key: Some("   ".into()),
            ..OpenWeatherConfig::default()
        };
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn environment_overrides_file_values() {
        temp_env::with_vars(
            [
                (API_KEY_ENV, Some("from-env")),
                (BASE_URL_ENV, Some("http://127.0.0.1:9999")),
                (BIND_ENV, Some("127.0.0.1:4000")),
                (PORT_ENV, Some("5050")),
            ],
            || {
                let mut config = ServerConfig::default();
                config.apply_env_overrides().expect("overrides apply");
                assert_eq!(config.openweather.api_key(), Some("from-env"));
                assert_eq!(config.openweather.base_url, "http://127.0.0.1:9999");
                assert_eq!(config.bind_address, "127.0.0.1:5050");
            },
        );
    }

    #[test]
    fn invalid_port_is_rejected() {
        temp_env::with_vars(
            [
                (API_KEY_ENV, None),
                (BASE_URL_ENV, None),
                (BIND_ENV, None),
                (PORT_ENV, Some("not-a-port")),
            ],
            || {
                let mut config = ServerConfig::default();
                assert!(matches!(config.apply_env_overrides(), Err(ConfigError::Invalid { .. })));
            },
        );
    }

    #[test]
    fn port_override_keeps_ipv6_host() {
        assert_eq!(with_port("[::1]:3000", 8080), "[::1]:8080");
        assert_eq!(with_port("garbage", 8080), "127.0.0.1:8080");
    }
}
