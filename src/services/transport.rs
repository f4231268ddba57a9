//! Thin HTTP layer shared by every backend call.
//!
//! Paths are resolved against the configured base URL; absolute URLs (presigned
//! upload targets, detail document links) are used as-is. Non-2xx responses are
//! turned into [`TransportError::Status`] so callers can log the body.
//!
//! The request timeout bounds JSON calls only. Media uploads are bounded by the
//! connect timeout alone, since a large video on a slow link can take minutes.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Header required by the bucket policy on every PUT.
pub const SSE_HEADER: &str = "x-amz-server-side-encryption";
pub const SSE_KMS: &str = "aws:kms";

/// Longest response body excerpt carried in errors and logs.
const BODY_EXCERPT_LEN: usize = 200;

#[derive(Debug, Clone)]
pub struct Transport {
    http: Client,
    base_url: String,
    request_timeout: Duration,
}

impl Transport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder()
            .user_agent(concat!("nutrition-analysis-client/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a path under the base URL and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        self.get_json_url(&self.url(path)).await
    }

    /// GET an absolute URL and decode the JSON body.
    pub async fn get_json_url<T: DeserializeOwned>(&self, url: &str) -> Result<T, TransportError> {
        let response = send(
            self.http
                .get(url)
                .header(ACCEPT, "application/json")
                .timeout(self.request_timeout),
        )
        .await?;
        Ok(response.json().await?)
    }

    /// POST a JSON body and return the successful response undecoded.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, TransportError> {
        send(
            self.http
                .post(self.url(path))
                .json(body)
                .timeout(self.request_timeout),
        )
        .await
    }

    /// PUT raw bytes to a presigned URL. No total deadline applies.
    pub async fn put_bytes(
        &self,
        url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), TransportError> {
        let request = self
            .http
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .header(SSE_HEADER, SSE_KMS)
            .body(bytes);
        send(request).await?;
        Ok(())
    }
}

async fn send(request: RequestBuilder) -> Result<Response, TransportError> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TransportError::Status {
            status: status.as_u16(),
            body: excerpt(&body),
        });
    }

    Ok(response)
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_LEN).collect()
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to read media file: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// True when the backend answered but refused the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, TransportError::Status { .. })
    }
}
