use std::path::PathBuf;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info};

use docqa_controllers::{
    AnswerController, ConfidenceBand, FollowUpController, Interaction, Phase, SearchController, UploadController,
};
use docqa_core::config::ClientSettings;
use docqa_core::types::{DocumentId, HealthStatus, Percent, SearchResult, UploadFile, VlmModel};
use docqa_core::Backend;
use docqa_render::{citation_markers, Renderer};

use crate::error::ViewError;
use crate::mode::{Mode, SearchStatus};
use crate::panels::{AnswerPanel, ProvenancePanel, SourcePanel, SourceRow};

/// Single-screen composition of the four controllers.
///
/// Holds only mode, model, selection and the staged QA file; everything else is read
/// from the controllers when a panel is built. Triggers refuse to start while the
/// same controller is still pending.
pub struct Orchestrator {
    backend: Arc<dyn Backend>,
    renderer: Renderer,
    download_dir: PathBuf,
    mode: Mode,
    model: VlmModel,
    search: SearchController,
    upload: UploadController,
    answer: AnswerController,
    follow_up: FollowUpController,
    selected: Option<DocumentId>,
    staged: Option<UploadFile>,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn Backend>, settings: &ClientSettings) -> Self {
        Self {
            backend,
            renderer: Renderer::new(settings.render.keywords.iter().cloned()),
            download_dir: settings.download.resolved_dir(),
            mode: Mode::Search,
            model: settings.qa.default_model,
            search: SearchController::new(settings.search.clone()),
            upload: UploadController::new(&settings.upload),
            answer: AnswerController::new(&settings.qa),
            follow_up: FollowUpController::new(),
            selected: None,
            staged: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!(from = %self.mode, to = %mode, "mode switched");
            self.mode = mode;
        }
    }

    pub fn model(&self) -> VlmModel {
        self.model
    }

    pub fn set_model(&mut self, model: VlmModel) {
        self.model = model;
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn search(&self) -> &SearchController {
        &self.search
    }

    pub fn upload_state(&self) -> &UploadController {
        &self.upload
    }

    pub fn answer(&self) -> &AnswerController {
        &self.answer
    }

    pub fn follow_up(&self) -> &FollowUpController {
        &self.follow_up
    }

    pub fn search_status(&self) -> SearchStatus {
        match self.search.phase() {
            Phase::Idle => SearchStatus::NotSearched,
            Phase::Pending => SearchStatus::Searching,
            Phase::Succeeded if self.search.results().is_empty() => SearchStatus::Empty,
            Phase::Succeeded => SearchStatus::Results,
            Phase::Failed => SearchStatus::Error,
        }
    }

    pub fn results(&self) -> &[SearchResult] {
        self.search.results()
    }

    /// Run a search and open provenance for its first result.
    pub async fn submit_search(&mut self, query: &str) -> Result<Phase, ViewError> {
        if self.search.is_pending() {
            return Err(ViewError::Busy("Search"));
        }
        let phase = self.search.search(self.backend.as_ref(), query, self.model).await;
        match phase {
            Phase::Succeeded => {
                let first = self.search.results().first().map(|r| r.id.clone());
                self.apply_selection(first);
            }
            Phase::Failed if !self.search.error().is_some_and(|e| e.is_validation()) => self.apply_selection(None),
            _ => {}
        }
        Ok(phase)
    }

    fn apply_selection(&mut self, id: Option<DocumentId>) {
        self.follow_up.set_document(id.clone());
        self.selected = id;
    }

    /// Show provenance for another result. Never re-runs the search.
    pub fn select(&mut self, id: &str) -> Result<(), ViewError> {
        if self.search.find(id).is_none() {
            return Err(ViewError::UnknownResult(id.to_string()));
        }
        self.apply_selection(Some(id.to_string()));
        Ok(())
    }

    pub fn select_citation(&mut self, citation: u32) -> Result<(), ViewError> {
        let id = self
            .results()
            .iter()
            .find(|r| r.citation_number == citation)
            .map(|r| r.id.clone())
            .ok_or(ViewError::UnknownCitation(citation))?;
        self.apply_selection(Some(id));
        Ok(())
    }

    pub fn selected(&self) -> Option<&SearchResult> {
        self.selected.as_deref().and_then(|id| self.search.find(id))
    }

    pub fn provenance(&self) -> Option<ProvenancePanel<'_>> {
        let result = self.selected()?;
        Some(ProvenancePanel {
            result,
            snippet: self.renderer.snippet(&result.snippet),
            preview_url: result.preview_url.clone().unwrap_or_else(|| self.backend.preview_url(&result.id)),
            thumbnail_url: result.thumbnail_url.clone().unwrap_or_else(|| self.backend.thumbnail_url(&result.id)),
            history: self.follow_up.history(),
        })
    }

    /// Ask about the selected result.
    pub async fn ask_follow_up(&mut self, question: &str) -> Result<Phase, ViewError> {
        if self.follow_up.is_pending() {
            return Err(ViewError::Busy("Follow-up question"));
        }
        if self.selected().is_none() {
            return Err(ViewError::NoSelection);
        }
        Ok(self.follow_up.ask(self.backend.as_ref(), question, self.model).await)
    }

    /// Attach a file to the next direct question. Replaces any earlier one.
    pub fn stage(&mut self, file: UploadFile) {
        debug!(file = %file.file_name, "file staged");
        self.staged = Some(file);
    }

    pub fn staged(&self) -> Option<&UploadFile> {
        self.staged.as_ref()
    }

    pub fn unstage(&mut self) {
        self.staged = None;
    }

    /// Upload a document for ingestion.
    pub async fn upload<F: FnMut(u8)>(&mut self, file: Option<&UploadFile>, on_progress: F) -> Result<Phase, ViewError> {
        if self.upload.is_pending() {
            return Err(ViewError::Busy("Upload"));
        }
        Ok(self.upload.upload(self.backend.as_ref(), file, None, on_progress).await)
    }

    /// Ask a direct question, uploading the staged file first if there is one.
    ///
    /// A blank question is rejected before anything is uploaded. An upload failure
    /// is reported by the upload controller and does not stop the question.
    pub async fn submit_question<F: FnMut(u8)>(&mut self, question: &str, on_progress: F) -> Result<Phase, ViewError> {
        if self.answer.is_pending() || self.upload.is_pending() {
            return Err(ViewError::Busy("Question"));
        }
        if question.trim().is_empty() {
            return Ok(self.answer.ask(self.backend.as_ref(), question).await);
        }
        if let Some(file) = self.staged.clone() {
            let uploaded = self.upload.upload(self.backend.as_ref(), Some(&file), None, on_progress).await;
            if uploaded == Phase::Succeeded {
                info!(file = %file.file_name, "staged file uploaded");
                self.staged = None;
            }
        }
        Ok(self.answer.ask(self.backend.as_ref(), question).await)
    }

    pub fn answer_panel(&self) -> Option<AnswerPanel<'_>> {
        let response = self.answer.response()?;
        Some(AnswerPanel {
            question: self.answer.question().unwrap_or_default(),
            answer: &response.answer,
            query_type: response.query_type,
            confidence: Percent::from_unit(response.confidence),
            band: ConfidenceBand::of(response.confidence),
            cited: citation_markers(&response.answer),
        })
    }

    /// Sources for the current answer, or `None` when it has none. Rows whose
    /// citation number appears as a `[n]` marker in the answer are flagged.
    pub fn source_panel(&self) -> Option<SourcePanel<'_>> {
        let sources = self.answer.sources();
        if sources.is_empty() {
            return None;
        }
        let cited = self.answer.answer().map(citation_markers).unwrap_or_default();
        let rows = (1..)
            .zip(sources)
            .map(|(citation, source)| SourceRow {
                citation,
                cited: cited.contains(&citation),
                source,
                similarity: Percent::from_unit(source.similarity),
                chunk: source.chunk_text.as_deref().map(|c| self.renderer.snippet(c)),
            })
            .collect();
        Some(SourcePanel { rows })
    }

    /// Start over in QA mode: answer, upload state and staged file are dropped.
    pub fn new_question(&mut self) {
        self.answer.clear();
        self.upload.clear();
        self.staged = None;
    }

    /// Drop search results and selection.
    pub fn clear_search(&mut self) {
        self.search.clear();
        self.apply_selection(None);
    }

    pub fn upload_progress(&self, now: Instant) -> u8 {
        self.upload.progress(now)
    }

    pub fn download_dir(&self) -> &PathBuf {
        &self.download_dir
    }

    /// Save a result's original file into the download directory.
    pub async fn download(&self, id: &str) -> Result<PathBuf, ViewError> {
        let result = self.search.find(id).ok_or_else(|| ViewError::UnknownResult(id.to_string()))?;
        let saved = self.backend.download(&result.id, &result.file_name, &self.download_dir).await?;
        info!(id, path = %saved.display(), "downloaded");
        Ok(saved)
    }

    pub async fn download_selected(&self) -> Result<PathBuf, ViewError> {
        let id = self.selected().map(|r| r.id.clone()).ok_or(ViewError::NoSelection)?;
        self.download(&id).await
    }

    pub async fn health(&self) -> Result<HealthStatus, ViewError> {
        Ok(self.backend.health().await?)
    }
}
