//! Upload negotiation, media upload and confirmation.
//!
//! Each step reports failure as `None`/`false` after logging. Network errors
//! and non-2xx responses are not distinguished at this boundary.

use std::path::Path;

use crate::models::upload::{UploadRequest, UploadTarget};
use crate::services::api::NutritionApiClient;
use crate::services::transport::TransportError;

pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";
pub const PNG_CONTENT_TYPE: &str = "image/png";
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Kind of media a workflow submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    /// Content type declared at negotiation and sent again on upload. The
    /// presigned URL is bound to it, so both must come from here.
    pub fn content_type(self, filename: &str) -> &'static str {
        match self {
            MediaKind::Video => VIDEO_CONTENT_TYPE,
            MediaKind::Image => image_content_type(filename),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Image => "image",
        }
    }
}

/// `.png` (any case) is PNG, everything else is sent as JPEG.
pub fn image_content_type(filename: &str) -> &'static str {
    if filename.to_lowercase().ends_with(".png") {
        PNG_CONTENT_TYPE
    } else {
        JPEG_CONTENT_TYPE
    }
}

impl NutritionApiClient {
    /// Request a presigned upload URL and job id. `content_type` defaults to
    /// `video/mp4`.
    pub async fn request_upload_url(
        &self,
        filename: &str,
        content_type: Option<&str>,
    ) -> Option<UploadTarget> {
        let content_type = content_type.unwrap_or(VIDEO_CONTENT_TYPE);
        tracing::debug!(
            url = %self.transport.url("/api/upload"),
            filename,
            content_type,
            "Requesting upload URL"
        );

        match self.try_request_upload_url(filename, content_type).await {
            Ok(target) => {
                tracing::info!(job_id = %target.job_id, "Upload URL received");
                Some(target)
            }
            Err(e) => {
                tracing::error!(
                    filename,
                    rejected = e.is_rejection(),
                    error = %e,
                    "Failed to request upload URL"
                );
                None
            }
        }
    }

    async fn try_request_upload_url(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<UploadTarget, TransportError> {
        let body = UploadRequest::Presigned {
            filename,
            content_type,
        };
        let response = self.transport.post_json("/api/upload", &body).await?;
        Ok(response.json().await?)
    }

    /// Read `media_path` and PUT it to the presigned target.
    pub async fn upload_media(
        &self,
        target: &UploadTarget,
        media_path: &Path,
        content_type: &str,
    ) -> bool {
        tracing::debug!(
            job_id = %target.job_id,
            path = %media_path.display(),
            content_type,
            "Uploading media"
        );

        match self.try_upload_media(target, media_path, content_type).await {
            Ok(size) => {
                tracing::info!(job_id = %target.job_id, bytes = size, "Media uploaded");
                true
            }
            Err(e) => {
                tracing::error!(job_id = %target.job_id, error = %e, "Failed to upload media");
                false
            }
        }
    }

    async fn try_upload_media(
        &self,
        target: &UploadTarget,
        media_path: &Path,
        content_type: &str,
    ) -> Result<usize, TransportError> {
        let bytes = tokio::fs::read(media_path).await?;
        let size = bytes.len();
        self.transport
            .put_bytes(&target.upload_url, bytes, content_type)
            .await?;
        Ok(size)
    }

    /// Tell the backend the upload is complete so the job gets queued.
    pub async fn confirm_upload(&self, job_id: &str) -> bool {
        let body = UploadRequest::Confirm { job_id };
        match self.transport.post_json("/api/upload", &body).await {
            Ok(response) => {
                let text = response.text().await.unwrap_or_default();
                tracing::info!(job_id, response = %text, "Upload confirmed, processing queued");
                true
            }
            Err(e) => {
                tracing::error!(job_id, error = %e, "Failed to confirm upload");
                false
            }
        }
    }
}
