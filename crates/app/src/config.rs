use std::time::Duration;

use taskdeck_remote::auth::DEFAULT_REFRESH_MARGIN;
use taskdeck_remote::{ConfigError, RemoteConfig};

/// Settings for one client session.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub remote: RemoteConfig,
    pub email: String,
    pub password: String,
    /// How long before expiry the access token is renewed.
    pub refresh_margin: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                        | Default    |
    /// |--------------------------------|------------|
    /// | `TASKDECK_URL`                 | (required) |
    /// | `TASKDECK_ANON_KEY`            | (required) |
    /// | `TASKDECK_EMAIL`               | (required) |
    /// | `TASKDECK_PASSWORD`            | (required) |
    /// | `TASKDECK_CALL_TIMEOUT_MS`     | `5000`     |
    /// | `TASKDECK_HTTP_TIMEOUT_SECS`   | `30`       |
    /// | `TASKDECK_REFRESH_MARGIN_SECS` | `60`       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let remote = RemoteConfig::from_lookup(&lookup)?;
        let email = required(&lookup, "TASKDECK_EMAIL")?;
        let password = required(&lookup, "TASKDECK_PASSWORD")?;

        let refresh_margin = match lookup("TASKDECK_REFRESH_MARGIN_SECS") {
            None => DEFAULT_REFRESH_MARGIN,
            Some(value) => value
                .trim()
                .parse()
                .map(Duration::from_secs)
                .map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                    var: "TASKDECK_REFRESH_MARGIN_SECS",
                    value,
                    reason: e.to_string(),
                })?,
        };

        Ok(Self {
            remote,
            email,
            password,
            refresh_margin,
        })
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<String, ConfigError> {
    lookup(var)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(var))
}
