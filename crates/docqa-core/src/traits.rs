use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::types::{
    AskRequest, AskResponse, FollowUpRequest, FollowUpResponse, HealthStatus, SearchRequest, SearchResponse,
    UploadRequest, UploadResponse,
};

/// One operation per backend capability. Implementations never retry; every failure
/// comes back as an already-normalized [`ApiError`].
#[async_trait]
pub trait Backend: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError>;

    async fn upload(&self, request: &UploadRequest) -> Result<UploadResponse, ApiError>;

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError>;

    async fn follow_up(&self, request: &FollowUpRequest) -> Result<FollowUpResponse, ApiError>;

    fn preview_url(&self, document_id: &str) -> String;

    fn thumbnail_url(&self, document_id: &str) -> String;

    /// Fetch the original document and save it as `dest_dir/file_name`.
    async fn download(&self, document_id: &str, file_name: &str, dest_dir: &Path) -> Result<PathBuf, ApiError>;

    async fn health(&self) -> Result<HealthStatus, ApiError>;
}

#[async_trait]
impl<T: Backend + ?Sized> Backend for Arc<T> {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        (**self).search(request).await
    }

    async fn upload(&self, request: &UploadRequest) -> Result<UploadResponse, ApiError> {
        (**self).upload(request).await
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError> {
        (**self).ask(request).await
    }

    async fn follow_up(&self, request: &FollowUpRequest) -> Result<FollowUpResponse, ApiError> {
        (**self).follow_up(request).await
    }

    fn preview_url(&self, document_id: &str) -> String {
        (**self).preview_url(document_id)
    }

    fn thumbnail_url(&self, document_id: &str) -> String {
        (**self).thumbnail_url(document_id)
    }

    async fn download(&self, document_id: &str, file_name: &str, dest_dir: &Path) -> Result<PathBuf, ApiError> {
        (**self).download(document_id, file_name, dest_dir).await
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        (**self).health().await
    }
}
