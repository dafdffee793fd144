//! Configuration management for the Skydeck server.
//! This module handles parsing, environment overrides, and validation of the
//! ~/.config/skydeck/server.json configuration file.

mod io;
pub mod model;
mod validation;

pub use io::{CONFIG_PATH_ENV, default_config_path, load_config, load_config_from_path};
pub use model::{ConfigError, OpenWeatherConfig, ServerConfig, WidgetConfig};
pub use validation::{resolve_bind_address, validate_config, validate_provider_url};
