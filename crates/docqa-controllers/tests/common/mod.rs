#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use docqa_client::MockBackend;
use docqa_core::types::{
    AskRequest, AskResponse, FollowUpRequest, FollowUpResponse, HealthStatus, SearchRequest, SearchResponse,
    UploadRequest, UploadResponse,
};
use docqa_core::{ApiError, Backend};

/// Wraps the canned backend, counting calls and optionally failing or stalling them.
#[derive(Default)]
pub struct CountingBackend {
    inner: MockBackend,
    pub fail_with: Option<ApiError>,
    pub delay: Option<Duration>,
    pub searches: AtomicUsize,
    pub uploads: AtomicUsize,
    pub asks: AtomicUsize,
    pub follow_ups: AtomicUsize,
    match_all: bool,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(err: ApiError) -> Self {
        Self { fail_with: Some(err), ..Self::default() }
    }

    pub fn slow(delay: Duration) -> Self {
        Self { delay: Some(delay), ..Self::default() }
    }

    /// Every query hits the whole corpus, with backend citation numbers counting down.
    pub fn matching_everything() -> Self {
        Self { match_all: true, ..Self::default() }
    }

    pub fn calls(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
            + self.uploads.load(Ordering::SeqCst)
            + self.asks.load(Ordering::SeqCst)
            + self.follow_ups.load(Ordering::SeqCst)
    }

    async fn gate(&self, counter: &AtomicUsize) -> Result<(), ApiError> {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Backend for CountingBackend {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        self.gate(&self.searches).await?;
        if !self.match_all {
            return self.inner.search(request).await;
        }
        let mut broad = request.clone();
        broad.query.clear();
        let mut response = self.inner.search(&broad).await?;
        for (i, r) in response.results.iter_mut().enumerate() {
            r.citation_number = 9 - i as u32;
        }
        Ok(response)
    }

    async fn upload(&self, request: &UploadRequest) -> Result<UploadResponse, ApiError> {
        self.gate(&self.uploads).await?;
        self.inner.upload(request).await
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError> {
        self.gate(&self.asks).await?;
        self.inner.ask(request).await
    }

    async fn follow_up(&self, request: &FollowUpRequest) -> Result<FollowUpResponse, ApiError> {
        self.gate(&self.follow_ups).await?;
        self.inner.follow_up(request).await
    }

    fn preview_url(&self, document_id: &str) -> String {
        self.inner.preview_url(document_id)
    }

    fn thumbnail_url(&self, document_id: &str) -> String {
        self.inner.thumbnail_url(document_id)
    }

    async fn download(&self, document_id: &str, file_name: &str, dest_dir: &Path) -> Result<PathBuf, ApiError> {
        self.inner.download(document_id, file_name, dest_dir).await
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.inner.health().await
    }
}
