use tracing::{debug, info, warn};

use docqa_core::config::SearchSettings;
use docqa_core::types::{SearchFilters, SearchRequest, SearchResponse, SearchResult, VlmModel};
use docqa_core::validate::non_blank;
use docqa_core::{ApiError, Backend, ValidationError};

use crate::phase::{ControllerError, Interaction, Phase};

/// Ranked search over the document base.
///
/// Every request carries the configured minimum similarity, so weak hits are
/// dropped by the backend rather than filtered here.
#[derive(Debug, Clone)]
pub struct SearchController {
    settings: SearchSettings,
    phase: Phase,
    error: Option<ControllerError>,
    response: Option<SearchResponse>,
    last_query: Option<String>,
}

impl SearchController {
    pub fn new(settings: SearchSettings) -> Self {
        Self { settings, phase: Phase::Idle, error: None, response: None, last_query: None }
    }

    /// Validate `query` and move to `Pending`, returning the request to send.
    ///
    /// A blank query leaves results untouched and records a validation error.
    pub fn begin(
        &mut self,
        query: &str,
        model: VlmModel,
        filters: Option<SearchFilters>,
    ) -> Result<SearchRequest, ValidationError> {
        let query = match non_blank(query, ValidationError::EmptyQuery) {
            Ok(q) => q.to_string(),
            Err(e) => {
                self.phase = Phase::Failed;
                self.error = Some(e.clone().into());
                return Err(e);
            }
        };
        self.phase = Phase::Pending;
        self.last_query = Some(query.clone());
        Ok(SearchRequest {
            query,
            model,
            strategy: self.settings.strategy,
            top_k: Some(self.settings.top_k),
            min_similarity: Some(self.settings.min_similarity),
            filters,
        })
    }

    /// Apply the outcome of a request started with [`begin`](Self::begin).
    ///
    /// Outcomes are applied in the order they are handed in; callers that allow
    /// overlapping requests get last-completed-wins.
    pub fn complete(&mut self, outcome: Result<SearchResponse, ApiError>) -> Phase {
        match outcome {
            Ok(mut response) => {
                for (i, result) in response.results.iter_mut().enumerate() {
                    result.citation_number = u32::try_from(i + 1).unwrap_or(u32::MAX);
                }
                info!(
                    hits = response.results.len(),
                    total = response.total_count,
                    query_ms = response.query_time,
                    "search completed"
                );
                self.response = Some(response);
                self.error = None;
                self.phase = Phase::Succeeded;
            }
            Err(err) => {
                warn!(status = err.status_code, message = %err.message, "search failed");
                self.response = None;
                self.error = Some(ControllerError::from_api(err, "Search failed"));
                self.phase = Phase::Failed;
            }
        }
        self.phase
    }

    pub async fn search<B: Backend + ?Sized>(&mut self, backend: &B, query: &str, model: VlmModel) -> Phase {
        self.search_with_filters(backend, query, model, None).await
    }

    pub async fn search_with_filters<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        query: &str,
        model: VlmModel,
        filters: Option<SearchFilters>,
    ) -> Phase {
        let Ok(request) = self.begin(query, model, filters) else {
            debug!("blank search query rejected");
            return self.phase;
        };
        debug!(query = %request.query, model = %request.model, strategy = %request.strategy, "searching");
        let outcome = backend.search(&request).await;
        self.complete(outcome)
    }

    /// Results in display order; `citation_number` is the 1-based position.
    pub fn results(&self) -> &[SearchResult] {
        self.response.as_ref().map(|r| r.results.as_slice()).unwrap_or_default()
    }

    pub fn response(&self) -> Option<&SearchResponse> {
        self.response.as_ref()
    }

    pub fn total_count(&self) -> Option<usize> {
        self.response.as_ref().map(|r| r.total_count)
    }

    /// Backend time for the last successful search, in milliseconds.
    pub fn query_time_ms(&self) -> Option<f64> {
        self.response.as_ref().map(|r| r.query_time)
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    pub fn find(&self, id: &str) -> Option<&SearchResult> {
        self.results().iter().find(|r| r.id == id)
    }

    pub fn clear(&mut self) {
        self.phase = Phase::Idle;
        self.error = None;
        self.response = None;
        self.last_query = None;
    }
}

impl Interaction for SearchController {
    fn phase(&self) -> Phase {
        self.phase
    }

    fn error(&self) -> Option<&ControllerError> {
        self.error.as_ref()
    }

    fn reset(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::config::ClientSettings;
    use docqa_core::types::{FileType, Percent, RetrievalStrategy, ThumbnailType};

    fn controller() -> SearchController {
        SearchController::new(ClientSettings::default().search)
    }

    fn hit(id: &str, citation: u32) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            file_name: format!("{id}.pdf"),
            file_path: "/".into(),
            file_type: FileType::Pdf,
            similarity: Percent::new(80),
            page: None,
            date: "2025-01-01".into(),
            snippet: String::new(),
            citation_number: citation,
            thumbnail_type: ThumbnailType::Pdf,
            thumbnail_url: None,
            preview_url: None,
            version: "v1".into(),
            structured_data: Vec::new(),
        }
    }

    fn response(ids: &[&str]) -> SearchResponse {
        SearchResponse {
            results: ids.iter().map(|id| hit(id, 99)).collect(),
            total_count: ids.len(),
            query_time: 12.0,
            model: VlmModel::Gpt4o,
            strategy: RetrievalStrategy::Vector,
        }
    }

    #[test]
    fn request_carries_threshold_and_trimmed_query() {
        let mut c = controller();
        let req = c.begin("  孔径  ", VlmModel::InternVl, None).unwrap();
        assert_eq!(req.query, "孔径");
        assert_eq!(req.min_similarity, Some(0.48));
        assert_eq!(req.top_k, Some(10));
        assert_eq!(req.strategy, RetrievalStrategy::Vector);
        assert_eq!(c.phase(), Phase::Pending);
    }

    #[test]
    fn citations_follow_display_order() {
        let mut c = controller();
        c.begin("q", VlmModel::Gpt4o, None).unwrap();
        assert_eq!(c.complete(Ok(response(&["b", "a", "c"]))), Phase::Succeeded);
        let numbers: Vec<u32> = c.results().iter().map(|r| r.citation_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(c.find("a").map(|r| r.citation_number), Some(2));
        assert_eq!(c.total_count(), Some(3));
        assert_eq!(c.query_time_ms(), Some(12.0));
        c.clear();
        assert_eq!(c.total_count(), None);
    }

    #[test]
    fn failure_clears_results_and_keeps_message() {
        let mut c = controller();
        c.begin("q", VlmModel::Gpt4o, None).unwrap();
        c.complete(Ok(response(&["a"])));
        c.begin("q2", VlmModel::Gpt4o, None).unwrap();
        c.complete(Err(ApiError::transport("connection refused")));
        assert_eq!(c.phase(), Phase::Failed);
        assert!(c.results().is_empty());
        assert_eq!(c.error().unwrap().to_string(), "connection refused");
    }

    #[test]
    fn empty_backend_message_gets_fallback() {
        let mut c = controller();
        c.begin("q", VlmModel::Gpt4o, None).unwrap();
        c.complete(Err(ApiError::transport("")));
        assert_eq!(c.error().unwrap().to_string(), "Search failed");
    }

    #[test]
    fn blank_query_keeps_previous_results() {
        let mut c = controller();
        c.begin("q", VlmModel::Gpt4o, None).unwrap();
        c.complete(Ok(response(&["a", "b"])));
        assert!(c.begin(" ", VlmModel::Gpt4o, None).is_err());
        assert_eq!(c.phase(), Phase::Failed);
        assert!(c.error().unwrap().is_validation());
        assert_eq!(c.results().len(), 2);
    }

    #[test]
    fn later_completion_wins() {
        let mut c = controller();
        c.begin("first", VlmModel::Gpt4o, None).unwrap();
        c.begin("second", VlmModel::Gpt4o, None).unwrap();
        c.complete(Ok(response(&["second"])));
        c.complete(Ok(response(&["first"])));
        assert_eq!(c.results()[0].id, "first");
    }
}
