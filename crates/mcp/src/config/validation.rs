//! Configuration validation for the Skydeck server.

use std::net::{IpAddr, SocketAddr};

use crate::config::{ConfigError, ServerConfig};
use tracing::debug;
use url::Url;

/// Validate the entire server configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), ConfigError> {
    validate_provider_url(&config.openweather.base_url)?;
    resolve_bind_address(&config.bind_address, config.allow_remote_bind)?;
    for origin in config.widget.connect_domains.iter().chain(&config.widget.resource_domains) {
        validate_widget_origin(origin)?;
    }
    debug!(bind_address = %config.bind_address, "validated server configuration");
    Ok(())
}

/// Validate the weather provider base URL. Plain HTTP is only accepted for
/// local hosts.
pub fn validate_provider_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)?;
    match url.scheme() {
        "https" => Ok(url),
        "http" if is_local_host(&url) => Ok(url),
        "http" => Err(ConfigError::Invalid {
            message: format!("provider URL '{raw}' must use https unless it points at localhost"),
        }),
        scheme => Err(ConfigError::Invalid {
            message: format!("unsupported URL scheme: {scheme} (expected http/https)"),
        }),
    }
}

fn is_local_host(url: &Url) -> bool {
    matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"))
}

/// Parse the bind address and refuse non-loopback interfaces unless remote
/// binding was allowed explicitly.
pub fn resolve_bind_address(raw: &str, allow_remote: bool) -> Result<SocketAddr, ConfigError> {
    let address: SocketAddr = raw.trim().parse().map_err(|_| ConfigError::Invalid {
        message: format!("bind address '{raw}' is not a valid socket address"),
    })?;
    if !allow_remote && !is_loopback(address.ip()) {
        return Err(ConfigError::Invalid {
            message: format!("refusing to bind {address}: set allowRemoteBind to expose the server beyond loopback"),
        });
    }
    Ok(address)
}

fn is_loopback(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback(),
        IpAddr::V6(v6) => v6.is_loopback(),
    }
}

/// Widget CSP origins may carry a leading wildcard label, so only the
/// scheme and emptiness are checked.
fn validate_widget_origin(origin: &str) -> Result<(), ConfigError> {
    let trimmed = origin.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid {
            message: "widget origin cannot be empty".to_string(),
        });
    }
    if !trimmed.starts_with("https://") && !trimmed.starts_with("http://") {
        return Err(ConfigError::Invalid {
            message: format!("widget origin '{trimmed}' must start with http:// or https://"),
        });
    }
    Ok(())
}
