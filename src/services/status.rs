use std::time::Duration;
use tokio::time::sleep;

use crate::models::job::{JobStatus, JobStatusResponse};
use crate::models::nutrition::NutritionAnalysisResult;
use crate::services::api::NutritionApiClient;
use crate::services::workflow::AnalysisError;

const DEFAULT_MAX_ATTEMPTS: u32 = 60;
const DEFAULT_INTERVAL_MS: u64 = 5000;

/// Receives human-readable stage messages. One-way: nothing is acknowledged.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, message: &str);
}

impl<F> ProgressObserver for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_progress(&self, message: &str) {
        self(message)
    }
}

pub(crate) fn notify(observer: Option<&dyn ProgressObserver>, message: &str) {
    if let Some(observer) = observer {
        observer.on_progress(message);
    }
}

/// Attempt ceiling and fixed delay for status polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub max_attempts: u32,
    /// Slept before every status check, including the first.
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
        }
    }
}

impl NutritionApiClient {
    /// GET /api/status/{job_id}. Any failure is logged and yields `None`.
    pub async fn check_status(&self, job_id: &str) -> Option<JobStatusResponse> {
        let path = format!("/api/status/{}", job_id);
        match self.transport.get_json::<JobStatusResponse>(&path).await {
            Ok(status) => {
                tracing::debug!(
                    job_id,
                    status = %status.status,
                    progress = status.progress,
                    "Job status"
                );
                Some(status)
            }
            Err(e) => {
                tracing::warn!(job_id, error = %e, "Failed to check status");
                None
            }
        }
    }

    /// Poll until the job reaches a terminal state, then fetch and normalize
    /// the detailed results.
    ///
    /// A failed status check still consumes an attempt. The loop is strictly
    /// sequential and has no cancellation hook beyond dropping the future.
    pub async fn poll_for_results(
        &self,
        job_id: &str,
        observer: Option<&dyn ProgressObserver>,
        settings: PollSettings,
    ) -> Result<NutritionAnalysisResult, AnalysisError> {
        for attempt in 0..settings.max_attempts {
            sleep(settings.interval).await;

            let Some(status) = self.check_status(job_id).await else {
                continue;
            };

            if !status.status.is_terminal() {
                notify(
                    observer,
                    &format!("Processing... ({}/{})", attempt + 1, settings.max_attempts),
                );
                continue;
            }

            match status.status {
                JobStatus::Completed => {
                    tracing::info!(job_id, attempt = attempt + 1, "Job completed");
                    notify(observer, "Analysis complete!");
                    return self
                        .get_results(job_id, true)
                        .await
                        .ok_or_else(|| AnalysisError::ResultsUnavailable {
                            job_id: job_id.to_string(),
                        });
                }
                // failed
                _ => {
                    let message = status
                        .error
                        .filter(|e| !e.is_empty())
                        .unwrap_or_else(|| "Analysis failed".to_string());
                    tracing::warn!(job_id, error = %message, "Job failed");
                    return Err(AnalysisError::JobFailed(message));
                }
            }
        }

        tracing::warn!(
            job_id,
            attempts = settings.max_attempts,
            "Job did not reach a terminal state"
        );
        Err(AnalysisError::Timeout {
            attempts: settings.max_attempts,
        })
    }
}
