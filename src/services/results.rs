use serde_json::Value;

use crate::models::job::JobStatus;
use crate::models::nutrition::{NutritionAnalysisResult, SegmentedImages};
use crate::services::api::NutritionApiClient;
use crate::services::normalize::{self, Extraction};

impl NutritionApiClient {
    /// GET /api/results/{job_id} and normalize the payload.
    ///
    /// Returns `None` only when the results payload itself cannot be fetched.
    /// Problems with the secondary detail document degrade to the fallback
    /// shapes instead.
    pub async fn get_results(&self, job_id: &str, detailed: bool) -> Option<NutritionAnalysisResult> {
        let path = if detailed {
            format!("/api/results/{}?detailed=true", job_id)
        } else {
            format!("/api/results/{}", job_id)
        };

        match self.transport.get_json::<Value>(&path).await {
            Ok(payload) => Some(self.normalize_results(job_id, payload).await),
            Err(e) => {
                tracing::error!(job_id, error = %e, "Failed to get results");
                None
            }
        }
    }

    /// Resolve the canonical result document from a results payload. Never fails.
    pub async fn normalize_results(&self, job_id: &str, payload: Value) -> NutritionAnalysisResult {
        let mut result = skeleton(job_id, &payload);

        if result.segmented_images.is_some() {
            tracing::debug!(job_id, "Segmented image URLs found in results");
        }

        let detail = match result.download_url.as_deref() {
            Some(url) => self.fetch_detail(job_id, url).await,
            None => {
                tracing::warn!(job_id, "No download_url provided in results");
                None
            }
        };

        let mut extraction = match &detail {
            Some(doc) => normalize::extract_detail(doc),
            None => {
                let fallback = normalize::detected_foods(&payload);
                if let Some(items) = &fallback {
                    tracing::info!(job_id, count = items.len(), "Using detected_foods from results");
                }
                Extraction {
                    items: fallback,
                    summary: None,
                }
            }
        };

        // Older payloads carry canonical-looking fields directly.
        if extraction.items.is_none() {
            extraction.items = payload
                .get("items")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(normalize::normalize_item).collect());
        }
        if extraction.summary.is_none() {
            let found = extraction.items.as_ref().map_or(0, Vec::len);
            extraction.summary = payload
                .get("nutrition_summary")
                .and_then(Value::as_object)
                .filter(|summary| !summary.is_empty())
                .map(|summary| normalize::summary_from_object(summary, found));
        }

        result.items = extraction.items.unwrap_or_default();
        result.nutrition_summary = extraction.summary;
        result.detailed_results = detail;

        tracing::info!(
            job_id,
            items = result.items.len(),
            has_summary = result.nutrition_summary.is_some(),
            "Results normalized"
        );
        for (index, item) in result.items.iter().enumerate() {
            tracing::debug!(
                job_id,
                index = index + 1,
                food = %item.food_name,
                kcal = item.total_calories.round(),
                grams = item.mass_g.round(),
                "Detected item"
            );
        }

        result
    }

    async fn fetch_detail(&self, job_id: &str, url: &str) -> Option<Value> {
        match self.transport.get_json_url::<Value>(url).await {
            Ok(doc) => {
                tracing::debug!(job_id, "Detailed results fetched");
                Some(doc)
            }
            Err(e) => {
                tracing::error!(
                    job_id,
                    error = %e,
                    "Failed to fetch detailed results, falling back to detected_foods"
                );
                None
            }
        }
    }
}

/// Everything except items and summary, copied leniently from the payload.
fn skeleton(job_id: &str, payload: &Value) -> NutritionAnalysisResult {
    let string = |key: &str| {
        payload
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    NutritionAnalysisResult {
        job_id: string("job_id").unwrap_or_else(|| job_id.to_string()),
        status: payload
            .get("status")
            .and_then(|status| serde_json::from_value::<JobStatus>(status.clone()).ok())
            .unwrap_or(JobStatus::Completed),
        created_at: string("created_at"),
        updated_at: string("updated_at"),
        completed_at: string("completed_at"),
        filename: string("filename"),
        download_url: string("download_url").filter(|url| !url.is_empty()),
        segmented_images: payload
            .get("segmented_images")
            .and_then(|images| serde_json::from_value::<SegmentedImages>(images.clone()).ok()),
        nutrition_summary: None,
        items: Vec::new(),
        detailed_results: None,
        error: string("error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_skeleton_is_lenient() {
        let payload = json!({
            "status": "mystery",
            "created_at": 12345,
            "filename": "lunch.mp4",
            "download_url": "",
            "segmented_images": {"overlay_urls": [{"frame": "0", "url": "u", "key": "k"}]}
        });
        let result = skeleton("job-7", &payload);
        assert_eq!(result.job_id, "job-7");
        assert_eq!(result.status, JobStatus::Completed);
        assert_eq!(result.created_at, None);
        assert_eq!(result.filename.as_deref(), Some("lunch.mp4"));
        assert_eq!(result.download_url, None);
        let images = result.segmented_images.unwrap();
        assert_eq!(images.overlay_urls.len(), 1);
        assert!(images.mask_urls.is_empty());
    }

    #[test]
    fn test_malformed_segmented_images_dropped() {
        let result = skeleton("job-7", &json!({"segmented_images": "nope"}));
        assert!(result.segmented_images.is_none());
    }
}
