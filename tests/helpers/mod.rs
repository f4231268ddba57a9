//! Test helper utilities: a mocked analysis backend and temporary media files

#![allow(dead_code)]

use serde_json::{json, Value};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::NamedTempFile;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nutrition_analysis_client::config::AppConfig;
use nutrition_analysis_client::{NutritionApiClient, PollSettings, ProgressObserver};

/// Client against the mock server with zero poll delay
pub fn client_for(server: &MockServer, max_attempts: u32) -> NutritionApiClient {
    NutritionApiClient::new(&server.uri())
        .expect("Failed to build client")
        .with_poll_settings(PollSettings {
            max_attempts,
            interval: Duration::ZERO,
        })
}

/// Client built from config with a short per-request timeout
pub fn client_with_request_timeout(server: &MockServer, secs: u64) -> NutritionApiClient {
    let config: AppConfig = envy::from_iter(vec![
        ("NUTRITION_API_URL".to_string(), server.uri()),
        ("REQUEST_TIMEOUT_SECS".to_string(), secs.to_string()),
        ("POLL_INTERVAL_MS".to_string(), "0".to_string()),
    ])
    .expect("Failed to read test config");
    NutritionApiClient::from_config(&config).expect("Failed to build client")
}

/// Write fake media bytes to a temp file with the given suffix
pub fn media_file(suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp media file");
    file.write_all(b"\x00\x00\x00\x18ftypmp42 fake media bytes")
        .expect("Failed to write temp media file");
    file
}

pub fn upload_url(server: &MockServer, job_id: &str) -> String {
    format!("{}/bucket/uploads/{}", server.uri(), job_id)
}

pub fn download_url(server: &MockServer, job_id: &str) -> String {
    format!("{}/bucket/results/{}.json", server.uri(), job_id)
}

/// POST /api/upload (presigned) answering with a job bound to `content_type`
pub async fn mount_negotiate(server: &MockServer, job_id: &str, content_type: &str) {
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(body_partial_json(json!({
            "type": "presigned",
            "content_type": content_type
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_id": job_id,
            "upload_url": upload_url(server, job_id),
            "status": "pending_upload",
            "message": "Upload URL generated"
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// PUT to the presigned URL; only matches the exact content type plus SSE header
pub async fn mount_upload(server: &MockServer, job_id: &str, content_type: &str) {
    Mock::given(method("PUT"))
        .and(path(format!("/bucket/uploads/{}", job_id)))
        .and(header("content-type", content_type))
        .and(header("x-amz-server-side-encryption", "aws:kms"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(server)
        .await;
}

/// POST /api/upload (confirm)
pub async fn mount_confirm(server: &MockServer, job_id: &str) {
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(body_partial_json(json!({"type": "confirm", "job_id": job_id})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_id": job_id,
            "status": "queued",
            "message": "Processing started"
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// Serve one status response per poll, in order
pub async fn mount_status_sequence(server: &MockServer, job_id: &str, responses: Vec<ResponseTemplate>) {
    for response in responses {
        Mock::given(method("GET"))
            .and(path(format!("/api/status/{}", job_id)))
            .respond_with(response)
            .up_to_n_times(1)
            .expect(1)
            .mount(server)
            .await;
    }
}

pub fn status(job_id: &str, status: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "job_id": job_id,
        "status": status,
        "created_at": "2025-03-01T12:00:00Z",
        "updated_at": "2025-03-01T12:00:05Z"
    }))
}

/// GET /api/results/{job_id}?detailed=true
pub async fn mount_results(server: &MockServer, job_id: &str, payload: Value, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/api/results/{}", job_id)))
        .and(query_param("detailed", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// GET on the detail document link
pub async fn mount_detail(server: &MockServer, job_id: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/bucket/results/{}.json", job_id)))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

/// Mount the whole happy path up to and including results
pub async fn mount_happy_path(
    server: &MockServer,
    job_id: &str,
    content_type: &str,
    results: Value,
) {
    mount_negotiate(server, job_id, content_type).await;
    mount_upload(server, job_id, content_type).await;
    mount_confirm(server, job_id).await;
    mount_status_sequence(server, job_id, vec![status(job_id, "completed")]).await;
    mount_results(server, job_id, results, 1).await;
}

/// Paths of every request the server saw, in arrival order
pub async fn request_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect()
}

/// Collects progress messages
#[derive(Default)]
pub struct RecordingObserver {
    messages: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_progress(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
