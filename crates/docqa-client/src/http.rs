//! reqwest-backed transport for the `/api` backend.
//!
//! Every failure (connect, timeout, non-2xx, undecodable body) is turned into an
//! [`ApiError`] here, so callers only ever see one error shape.
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use docqa_core::config::ApiSettings;
use docqa_core::types::{
    AskRequest, AskResponse, FollowUpRequest, FollowUpResponse, HealthStatus, SearchRequest, SearchResponse,
    UploadRequest, UploadResponse,
};
use docqa_core::{ApiError, Backend};

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(normalize)?;
        Ok(Self { client, base_url: settings.base_url.trim_end_matches('/').to_string() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        debug!(path, "POST");
        let response = self.client.post(self.url(path)).json(body).send().await.map_err(|e| {
            warn!(path, error = %e, "request failed");
            normalize(e)
        })?;
        decode(path, response).await
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        debug!(path, "GET");
        let response = self.client.get(self.url(path)).send().await.map_err(|e| {
            warn!(path, error = %e, "request failed");
            normalize(e)
        })?;
        decode(path, response).await
    }
}

fn normalize(err: reqwest::Error) -> ApiError {
    ApiError::from_response(err.status().map(|s| s.as_u16()), b"", err.to_string())
}

/// Turn a non-2xx response into an [`ApiError`], reading its body for structured fields.
async fn reject(path: &str, response: Response) -> ApiError {
    let status = response.status();
    let body = response.bytes().await.unwrap_or_default();
    let err = ApiError::from_response(
        Some(status.as_u16()),
        &body,
        format!("Request failed with status code {}", status.as_u16()),
    );
    warn!(path, status = status.as_u16(), message = %err.message, "backend rejected request");
    err
}

async fn decode<R: DeserializeOwned>(path: &str, response: Response) -> Result<R, ApiError> {
    if !response.status().is_success() {
        return Err(reject(path, response).await);
    }
    let body = response.bytes().await.map_err(normalize)?;
    serde_json::from_slice(&body).map_err(|e| {
        warn!(path, error = %e, "malformed response body");
        ApiError::transport(format!("Malformed response from {path}: {e}"))
    })
}

/// Keep only the final path component so a backend-supplied name cannot escape `dest_dir`.
fn safe_file_name(file_name: &str, fallback: &str) -> String {
    Path::new(file_name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[async_trait]
impl Backend for HttpBackend {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        self.post_json("/search", request).await
    }

    async fn upload(&self, request: &UploadRequest) -> Result<UploadResponse, ApiError> {
        let file = tokio::fs::File::open(&request.file.path)
            .await
            .map_err(|e| ApiError::transport(format!("Cannot read {}: {e}", request.file.path.display())))?;
        let part = Part::stream_with_length(Body::from(file), request.file.size).file_name(request.file.file_name.clone());
        let mut form = Form::new().part("file", part);
        if let Some(metadata) = &request.metadata {
            let json = serde_json::to_string(metadata).map_err(|e| ApiError::transport(e.to_string()))?;
            form = form.text("metadata", json);
        }

        debug!(file = %request.file.file_name, size = request.file.size, "POST /upload");
        let response = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "upload failed");
                normalize(e)
            })?;
        decode("/upload", response).await
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError> {
        self.post_json("/ask", request).await
    }

    async fn follow_up(&self, request: &FollowUpRequest) -> Result<FollowUpResponse, ApiError> {
        self.post_json("/question", request).await
    }

    fn preview_url(&self, document_id: &str) -> String {
        self.url(&format!("/preview/{document_id}"))
    }

    fn thumbnail_url(&self, document_id: &str) -> String {
        self.url(&format!("/thumbnail/{document_id}"))
    }

    async fn download(&self, document_id: &str, file_name: &str, dest_dir: &Path) -> Result<PathBuf, ApiError> {
        let path = format!("/download/{document_id}");
        debug!(path = %path, "GET");
        let response = self.client.get(self.url(&path)).send().await.map_err(normalize)?;
        if !response.status().is_success() {
            return Err(reject(&path, response).await);
        }

        let io_err = |e: std::io::Error| ApiError::transport(format!("Cannot save download: {e}"));
        tokio::fs::create_dir_all(dest_dir).await.map_err(io_err)?;
        let target = dest_dir.join(safe_file_name(file_name, document_id));
        let mut out = tokio::fs::File::create(&target).await.map_err(io_err)?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(normalize)?;
            out.write_all(&chunk).await.map_err(io_err)?;
        }
        out.flush().await.map_err(io_err)?;
        debug!(target = %target.display(), "download saved");
        Ok(target)
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json("/health").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations_are_built_from_base_url() {
        let backend = HttpBackend::new(&ApiSettings { base_url: "http://host:8000/api/".into(), timeout_secs: 30 })
            .expect("client");
        assert_eq!(backend.preview_url("abc"), "http://host:8000/api/preview/abc");
        assert_eq!(backend.thumbnail_url("abc"), "http://host:8000/api/thumbnail/abc");
    }

    #[test]
    fn download_names_cannot_traverse() {
        assert_eq!(safe_file_name("../../etc/passwd", "id"), "passwd");
        assert_eq!(safe_file_name("", "id-7"), "id-7");
        assert_eq!(safe_file_name("MotorBracket_v1.2.dwg", "id"), "MotorBracket_v1.2.dwg");
    }
}
