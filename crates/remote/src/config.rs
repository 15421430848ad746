use std::time::Duration;

use crate::timeout::DEFAULT_CALL_TIMEOUT;

/// Default HTTP client timeout, applied to every request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Project URL without a trailing slash, e.g. `https://xyz.example.co`.
    pub base_url: String,
    /// Public (anon) API key sent as `apikey` on every request.
    pub api_key: String,
    /// Duration of the timeout race on bounded calls.
    pub call_timeout: Duration,
    /// Transport-level timeout for every HTTP request.
    pub http_timeout: Duration,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                      | Default     |
    /// |------------------------------|-------------|
    /// | `TASKDECK_URL`               | (required)  |
    /// | `TASKDECK_ANON_KEY`          | (required)  |
    /// | `TASKDECK_CALL_TIMEOUT_MS`   | `5000`      |
    /// | `TASKDECK_HTTP_TIMEOUT_SECS` | `30`        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("TASKDECK_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("TASKDECK_URL"))?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "TASKDECK_URL",
                value: base_url,
                reason: "must start with http:// or https://".to_string(),
            });
        }

        let api_key = lookup("TASKDECK_ANON_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("TASKDECK_ANON_KEY"))?;

        let call_timeout_ms = parse_u64(&lookup, "TASKDECK_CALL_TIMEOUT_MS", 5000)?;
        let http_timeout_secs = parse_u64(&lookup, "TASKDECK_HTTP_TIMEOUT_SECS", 30)?;

        let mut config = Self::new(base_url, api_key);
        config.call_timeout = Duration::from_millis(call_timeout_ms);
        config.http_timeout = Duration::from_secs(http_timeout_secs);
        Ok(config)
    }
}

fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::Invalid {
                var,
                value,
                reason: e.to_string(),
            }
        }),
    }
}
