use serde::Deserialize;
use std::time::Duration;

use crate::config::{AppConfig, DEFAULT_API_URL};
use crate::services::status::PollSettings;
use crate::services::transport::{Transport, TransportError};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the nutrition analysis backend.
///
/// Holds no per-job state: every workflow owns its job id and locals, so a
/// single client can drive several analyses concurrently. The individual
/// steps live in sibling modules (`upload`, `status`, `results`, `workflow`).
#[derive(Debug, Clone)]
pub struct NutritionApiClient {
    pub(crate) transport: Transport,
    pub(crate) poll: PollSettings,
}

#[derive(Deserialize)]
struct HealthResponse {
    #[serde(default)]
    status: String,
}

impl NutritionApiClient {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Ok(Self {
            transport: Transport::new(base_url, DEFAULT_REQUEST_TIMEOUT)?,
            poll: PollSettings::default(),
        })
    }

    /// Client pointed at the managed backend.
    pub fn managed() -> Result<Self, TransportError> {
        Self::new(DEFAULT_API_URL)
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, TransportError> {
        Ok(Self {
            transport: Transport::new(&config.nutrition_api_url, config.request_timeout())?,
            poll: config.poll_settings(),
        })
    }

    pub fn with_poll_settings(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn poll_settings(&self) -> PollSettings {
        self.poll
    }

    /// GET /health — true only when the backend reports `"healthy"`.
    pub async fn check_health(&self) -> bool {
        match self.transport.get_json::<HealthResponse>("/health").await {
            Ok(health) => {
                tracing::info!(status = %health.status, "Health check");
                health.status == "healthy"
            }
            Err(e) => {
                tracing::error!(error = %e, "Health check failed");
                false
            }
        }
    }
}
