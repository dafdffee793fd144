//! Configuration IO helpers for the Skydeck server.

use crate::config::{ConfigError, ServerConfig, validate_config};
use dirs_next::config_dir;
use skydeck_util::expand_tilde;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable that points at an alternate configuration file.
pub const CONFIG_PATH_ENV: &str = "SKYDECK_CONFIG_PATH";

/// Returns the default path for the server configuration file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir().unwrap_or_else(|| PathBuf::from(".")).join("skydeck").join("server.json")
}

/// Loads the configuration file, applies environment overrides, and validates
/// the result. `path` falls back to [`default_config_path`].
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    let mut config = load_config_from_path(&path)?;
    config.apply_env_overrides()?;
    validate_config(&config)?;
    Ok(config)
}

/// Loads and parses the configuration file at `path` without applying
/// overrides. A missing file yields the defaults.
pub fn load_config_from_path(path: &Path) -> Result<ServerConfig, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "no configuration file; using defaults");
        return Ok(ServerConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config: ServerConfig = serde_json::from_str(&content)?;
    debug!(path = %path.display(), "loaded configuration file");
    Ok(config)
}
