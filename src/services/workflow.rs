//! End-to-end analysis flows: negotiate → upload → confirm → poll → normalize.

use std::path::Path;
use std::time::Instant;

use crate::models::nutrition::NutritionAnalysisResult;
use crate::services::api::NutritionApiClient;
use crate::services::status::{notify, ProgressObserver};
use crate::services::upload::MediaKind;

/// Why an analysis produced no result document.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Negotiation, upload or confirmation failed. The stage is in the logs.
    #[error("Analysis submission failed")]
    Submission,

    /// The backend marked the job failed; carries its message verbatim.
    #[error("{0}")]
    JobFailed(String),

    #[error("Analysis timeout after {attempts} status checks")]
    Timeout { attempts: u32 },

    #[error("Results for job {job_id} could not be fetched")]
    ResultsUnavailable { job_id: String },
}

impl AnalysisError {
    fn reason(&self) -> &'static str {
        match self {
            AnalysisError::Submission => "submission",
            AnalysisError::JobFailed(_) => "job_failed",
            AnalysisError::Timeout { .. } => "timeout",
            AnalysisError::ResultsUnavailable { .. } => "results_unavailable",
        }
    }
}

/// How a finished workflow should be presented. A failed analysis and a
/// completed one with nothing detected are different outcomes.
#[derive(Debug)]
pub enum AnalysisOutcome {
    Detected(NutritionAnalysisResult),
    NoItemsDetected(NutritionAnalysisResult),
    Failed(AnalysisError),
}

impl AnalysisOutcome {
    pub fn headline(&self) -> &'static str {
        match self {
            AnalysisOutcome::Detected(_) => "Food items detected",
            AnalysisOutcome::NoItemsDetected(_) => "No items detected",
            AnalysisOutcome::Failed(_) => "Analysis failed",
        }
    }

    pub fn result(&self) -> Option<&NutritionAnalysisResult> {
        match self {
            AnalysisOutcome::Detected(result) | AnalysisOutcome::NoItemsDetected(result) => {
                Some(result)
            }
            AnalysisOutcome::Failed(_) => None,
        }
    }
}

impl From<Result<NutritionAnalysisResult, AnalysisError>> for AnalysisOutcome {
    fn from(result: Result<NutritionAnalysisResult, AnalysisError>) -> Self {
        match result {
            Ok(result) if result.has_items() => AnalysisOutcome::Detected(result),
            Ok(result) => AnalysisOutcome::NoItemsDetected(result),
            Err(e) => AnalysisOutcome::Failed(e),
        }
    }
}

/// Register metric descriptions with whatever recorder the host installed.
pub fn describe_metrics() {
    metrics::describe_counter!(
        "nutrition_analysis_started_total",
        "Analysis workflows started"
    );
    metrics::describe_counter!(
        "nutrition_analysis_completed_total",
        "Analysis workflows that produced a result document"
    );
    metrics::describe_counter!(
        "nutrition_analysis_failed_total",
        "Analysis workflows that failed, by reason"
    );
    metrics::describe_histogram!(
        "nutrition_analysis_seconds",
        "Wall time of an analysis workflow"
    );
}

impl NutritionApiClient {
    /// Upload a video and wait for its nutrition analysis.
    pub async fn analyze_video(
        &self,
        video_path: &Path,
        filename: &str,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<NutritionAnalysisResult, AnalysisError> {
        self.analyze(MediaKind::Video, video_path, filename, observer)
            .await
    }

    /// Upload an image and wait for its nutrition analysis. The content type
    /// is derived from `filename`.
    pub async fn analyze_image(
        &self,
        image_path: &Path,
        filename: &str,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<NutritionAnalysisResult, AnalysisError> {
        self.analyze(MediaKind::Image, image_path, filename, observer)
            .await
    }

    async fn analyze(
        &self,
        kind: MediaKind,
        media_path: &Path,
        filename: &str,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<NutritionAnalysisResult, AnalysisError> {
        let media = kind.as_str();
        let start = Instant::now();
        metrics::counter!("nutrition_analysis_started_total", "media" => media).increment(1);

        let result = self.run_stages(kind, media_path, filename, observer).await;

        metrics::histogram!("nutrition_analysis_seconds", "media" => media)
            .record(start.elapsed().as_secs_f64());
        match &result {
            Ok(analysis) => {
                metrics::counter!("nutrition_analysis_completed_total", "media" => media)
                    .increment(1);
                tracing::info!(
                    job_id = %analysis.job_id,
                    media,
                    items = analysis.items.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Analysis complete"
                );
            }
            Err(e) => {
                metrics::counter!(
                    "nutrition_analysis_failed_total",
                    "media" => media,
                    "reason" => e.reason()
                )
                .increment(1);
                tracing::error!(media, filename, error = %e, "Analysis failed");
            }
        }

        result
    }

    async fn run_stages(
        &self,
        kind: MediaKind,
        media_path: &Path,
        filename: &str,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<NutritionAnalysisResult, AnalysisError> {
        let content_type = kind.content_type(filename);

        notify(observer, "Requesting upload URL...");
        let target = self
            .request_upload_url(filename, Some(content_type))
            .await
            .ok_or_else(|| stage_failed("negotiate", filename))?;

        notify(
            observer,
            match kind {
                MediaKind::Video => "Uploading video...",
                MediaKind::Image => "Uploading image...",
            },
        );
        if !self.upload_media(&target, media_path, content_type).await {
            return Err(stage_failed("upload", filename));
        }

        notify(observer, "Starting analysis...");
        if !self.confirm_upload(&target.job_id).await {
            return Err(stage_failed("confirm", filename));
        }

        notify(
            observer,
            match kind {
                MediaKind::Video => "Processing video...",
                MediaKind::Image => "Processing image...",
            },
        );
        self.poll_for_results(&target.job_id, observer, self.poll)
            .await
    }
}

fn stage_failed(stage: &str, filename: &str) -> AnalysisError {
    tracing::error!(stage, filename, "Analysis aborted before processing started");
    AnalysisError::Submission
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::JobStatus;
    use crate::models::nutrition::NutritionItem;

    fn result_with(items: Vec<NutritionItem>) -> NutritionAnalysisResult {
        NutritionAnalysisResult {
            job_id: "job-1".to_string(),
            status: JobStatus::Completed,
            created_at: None,
            updated_at: None,
            completed_at: None,
            filename: None,
            download_url: None,
            segmented_images: None,
            nutrition_summary: None,
            items,
            detailed_results: None,
            error: None,
        }
    }

    #[test]
    fn test_outcome_distinguishes_empty_from_failed() {
        let empty = AnalysisOutcome::from(Ok::<_, AnalysisError>(result_with(Vec::new())));
        assert_eq!(empty.headline(), "No items detected");
        assert!(empty.result().is_some());

        let failed = AnalysisOutcome::from(Err::<NutritionAnalysisResult, _>(AnalysisError::Submission));
        assert_eq!(failed.headline(), "Analysis failed");
        assert!(failed.result().is_none());

        let detected = AnalysisOutcome::from(Ok::<_, AnalysisError>(result_with(vec![NutritionItem {
            food_name: "Rice".to_string(),
            mass_g: 100.0,
            volume_ml: None,
            total_calories: 130.0,
        }])));
        assert_eq!(detected.headline(), "Food items detected");
    }

    #[test]
    fn test_job_failed_message_is_verbatim() {
        let err = AnalysisError::JobFailed("low confidence".to_string());
        assert_eq!(err.to_string(), "low confidence");
        assert_eq!(
            AnalysisError::Timeout { attempts: 60 }.to_string(),
            "Analysis timeout after 60 status checks"
        );
    }
}
