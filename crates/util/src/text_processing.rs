//! # Text Processing Utilities
//!
//! Redaction of credential-looking values before they reach logs.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Redacts values that look like secrets in a string.
///
/// Key names are preserved so log lines stay useful for debugging.
///
/// # Example
/// ```rust
/// use skydeck_util::text_processing::redact_sensitive;
///
/// assert_eq!(redact_sensitive("OWM_API_KEY=abc123"), "OWM_API_KEY=[REDACTED]");
/// assert_eq!(
///     redact_sensitive("GET /weather?lat=1&appid=abc123&units=metric"),
///     "GET /weather?lat=1&appid=[REDACTED]&units=metric"
/// );
/// ```
pub fn redact_sensitive(input: &str) -> String {
    redact_sensitive_with(input, "[REDACTED]")
}

/// Redacts sensitive-looking values, using a custom replacement token.
pub fn redact_sensitive_with(input: &str, replacement: &str) -> String {
    let mut redacted = input.to_string();

    for pattern in get_redact_patterns().iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                let suffix = captures.get(3).map(|m| m.as_str()).unwrap_or("");
                format!("{}{}{}", prefix, replacement, suffix)
            })
            .to_string();
    }

    redacted
}

/// Returns compiled regex patterns for detecting sensitive information.
///
/// Each pattern captures the key in group 1, the secret in group 2 and an
/// optional closing delimiter in group 3.
pub fn get_redact_patterns() -> &'static Vec<Regex> {
    static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(build_redact_patterns);

    &REDACT_PATTERNS
}

fn build_redact_patterns() -> Vec<Regex> {
    const PATTERNS: &[&str] = &[
        r"(?i)(authorization:\s+)([^\s]+(?:\s+[^\s]+)*)()",
        r"(?i)((?:^|[?&])(?:appid|api_key|apikey|token)=)([^&\s]+)()",
        r"(?i)((?:export\s+)?[A-Za-z0-9_]*?(?:API_KEY|TOKEN|SECRET|PASSWORD)[A-Za-z0-9_]*\s*=\s*)([^\s&]+)()",
        "(?i)(\"[A-Za-z0-9_]*(?:apiKey|api_key|token|secret|password)\"\\s*:\\s*\")([^\"]+)(\")",
    ];
    PATTERNS
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
}

/// Redacts every string inside a JSON value.
pub fn redact_json(v: &Value) -> Value {
    match v {
        Value::String(s) => Value::String(redact_sensitive(s)),
        Value::Array(arr) => Value::Array(arr.iter().map(redact_json).collect()),
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, val) in map.iter() {
                out.insert(k.clone(), redact_json(val));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_env_assignments_and_query_params() {
        assert_eq!(redact_sensitive("OWM_API_KEY=abc123 PORT=3000"), "OWM_API_KEY=[REDACTED] PORT=3000");
        assert_eq!(
            redact_sensitive("https://api.example.com/weather?appid=abc123"),
            "https://api.example.com/weather?appid=[REDACTED]"
        );
    }

    #[test]
    fn redacts_json_string_fields() {
        assert_eq!(
            redact_sensitive(r#"{"apiKey":"abc123","port":3000}"#),
            r#"{"apiKey":"[REDACTED]","port":3000}"#
        );
    }

    #[test]
    fn redact_json_walks_nested_values() {
        let value = serde_json::json!({ "lines": ["Authorization: Bearer abc", "ok"] });
        let redacted = redact_json(&value);
        assert_eq!(redacted["lines"][0], "Authorization: [REDACTED]");
        assert_eq!(redacted["lines"][1], "ok");
    }
}
