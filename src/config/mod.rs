use garde::Validate;
use serde::Deserialize;
use std::time::Duration;

use crate::services::status::PollSettings;

/// Managed backend used when `NUTRITION_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "https://qx3i66fa87.execute-api.us-east-1.amazonaws.com/v1";

#[derive(Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Base URL of the nutrition analysis backend (e.g., "http://10.0.2.2:8000").
    #[serde(default = "default_api_url")]
    #[garde(length(min = 1))]
    pub nutrition_api_url: String,

    /// Status checks before a job is reported as timed out.
    #[serde(default = "default_poll_max_attempts")]
    #[garde(range(min = 1))]
    pub poll_max_attempts: u32,

    /// Delay before each status check, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    #[garde(skip)]
    pub poll_interval_ms: u64,

    /// Per-request HTTP timeout, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    #[garde(range(min = 1))]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_poll_max_attempts() -> u32 {
    60
}

fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config: Self = envy::from_env()?;
        config.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            max_attempts: self.poll_max_attempts,
            interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] garde::Report),
}
