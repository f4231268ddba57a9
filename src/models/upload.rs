use serde::{Deserialize, Serialize};

/// Body of `POST /api/upload`. The same endpoint negotiates and confirms.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UploadRequest<'a> {
    Presigned {
        filename: &'a str,
        content_type: &'a str,
    },
    Confirm {
        job_id: &'a str,
    },
}

/// Presigned destination for one job's media bytes. Single use.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadTarget {
    pub job_id: String,
    pub upload_url: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
