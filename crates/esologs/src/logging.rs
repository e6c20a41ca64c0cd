//! Structured logging setup and sensitive data redaction.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Field names scrubbed by [`redact_sensitive`] unless told otherwise.
pub const DEFAULT_REDACT_FIELDS: &[&str] = &[
    "access_token",
    "refresh_token",
    "client_secret",
    "secret",
    "password",
    "authorization",
    "code_verifier",
];

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".into()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

/// A global subscriber could not be installed.
#[derive(Debug, Error)]
#[error("Failed to initialize logging: {0}")]
pub struct LoggingInitError(String);

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` wins over [`LogConfig::level`]. Fails if a subscriber is
/// already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config.json {
        let json_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE);

        subscriber
            .with(json_layer)
            .try_init()
            .map_err(|e| LoggingInitError(e.to_string()))
    } else {
        let pretty_layer = fmt::layer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE);

        subscriber
            .with(pretty_layer)
            .try_init()
            .map_err(|e| LoggingInitError(e.to_string()))
    }
}

/// Replace the values of sensitive keys, at any depth, with `"[REDACTED]"`.
///
/// Keys match case-insensitively when they contain one of `fields`.
#[must_use]
pub fn redact_sensitive(value: &Value, fields: &[&str]) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, val)| {
                    let lowered = key.to_lowercase();
                    let redacted = if fields
                        .iter()
                        .any(|field| lowered.contains(&field.to_lowercase()))
                    {
                        Value::String("[REDACTED]".to_string())
                    } else {
                        redact_sensitive(val, fields)
                    };
                    (key.clone(), redacted)
                })
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| redact_sensitive(v, fields)).collect())
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redact_nested() {
        let value = json!({
            "client_id": "abc",
            "client_secret": "s3cret",
            "token": {"access_token": "tok", "token_type": "Bearer"},
            "items": [{"Authorization": "Bearer tok"}, {"code": "r1"}]
        });

        let redacted = redact_sensitive(&value, DEFAULT_REDACT_FIELDS);

        assert_eq!(redacted["client_id"], "abc");
        assert_eq!(redacted["client_secret"], "[REDACTED]");
        assert_eq!(redacted["token"]["access_token"], "[REDACTED]");
        assert_eq!(redacted["token"]["token_type"], "Bearer");
        assert_eq!(redacted["items"][0]["Authorization"], "[REDACTED]");
        assert_eq!(redacted["items"][1]["code"], "r1");
    }

    #[test]
    fn test_query_variables_pass_through() {
        let vars = json!({"code": "a1B2c3", "startTime": 1_700_000_000_000_i64});
        assert_eq!(redact_sensitive(&vars, DEFAULT_REDACT_FIELDS), vars);
    }

    #[test]
    fn test_log_config_defaults() {
        let config: LogConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.level, "info");
        assert!(!config.json);
    }
}
