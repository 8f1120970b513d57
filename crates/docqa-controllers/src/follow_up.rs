use chrono::Utc;
use tracing::{debug, info, warn};

use docqa_core::types::{DocumentId, FollowUpRequest, FollowUpResponse, QaHistoryItem, VlmModel};
use docqa_core::validate::non_blank;
use docqa_core::{ApiError, Backend, ValidationError};

use crate::phase::{ControllerError, Interaction, Phase};

/// A follow-up request together with the dialogue it was asked in.
///
/// Returned by [`FollowUpController::begin`] and handed back to
/// [`FollowUpController::complete`], so each answer is filed under its own question
/// even when requests overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowUpTicket {
    pub request: FollowUpRequest,
    dialogue: u64,
}

/// Follow-up dialogue scoped to one document.
///
/// History belongs to the active document only. Changing the document or clearing
/// starts a new dialogue, and answers to questions from an earlier dialogue are dropped.
#[derive(Debug, Clone, Default)]
pub struct FollowUpController {
    document: Option<DocumentId>,
    history: Vec<QaHistoryItem>,
    dialogue: u64,
    phase: Phase,
    error: Option<ControllerError>,
}

impl FollowUpController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// Point the dialogue at `document`. A different document starts a fresh history.
    pub fn set_document(&mut self, document: Option<DocumentId>) {
        if self.document == document {
            return;
        }
        debug!(from = ?self.document, to = ?document, "follow-up document changed");
        self.document = document;
        self.clear();
    }

    pub fn begin(&mut self, question: &str, model: VlmModel) -> Result<FollowUpTicket, ValidationError> {
        let checked = match &self.document {
            None => Err(ValidationError::NoActiveDocument),
            Some(doc) => non_blank(question, ValidationError::EmptyQuestion).map(|q| (doc.clone(), q.to_string())),
        };
        let (document_id, question) = match checked {
            Ok(pair) => pair,
            Err(e) => {
                self.phase = Phase::Failed;
                self.error = Some(e.clone().into());
                return Err(e);
            }
        };
        self.phase = Phase::Pending;
        Ok(FollowUpTicket { request: FollowUpRequest { document_id, question, model }, dialogue: self.dialogue })
    }

    pub fn complete(&mut self, ticket: FollowUpTicket, outcome: Result<FollowUpResponse, ApiError>) -> Phase {
        let FollowUpRequest { document_id, question, .. } = ticket.request;
        if ticket.dialogue != self.dialogue {
            debug!(document_id = %document_id, "dropping follow-up answer from an earlier dialogue");
            return self.phase;
        }
        match outcome {
            Ok(response) => {
                info!(document_id = %document_id, turns = self.history.len() + 1, "follow-up answered");
                self.history.push(QaHistoryItem { question, answer: response.answer, timestamp: Utc::now() });
                self.error = None;
                self.phase = Phase::Succeeded;
            }
            Err(err) => {
                warn!(document_id = %document_id, status = err.status_code, message = %err.message, "follow-up failed");
                self.error = Some(ControllerError::from_api(err, "Failed to get an answer"));
                self.phase = Phase::Failed;
            }
        }
        self.phase
    }

    pub async fn ask<B: Backend + ?Sized>(&mut self, backend: &B, question: &str, model: VlmModel) -> Phase {
        let Ok(ticket) = self.begin(question, model) else {
            return self.phase;
        };
        let outcome = backend.follow_up(&ticket.request).await;
        self.complete(ticket, outcome)
    }

    /// Exchanges for the active document, oldest first.
    pub fn history(&self) -> &[QaHistoryItem] {
        &self.history
    }

    /// Clear history and error; the active document is kept.
    pub fn clear(&mut self) {
        self.history.clear();
        self.dialogue += 1;
        self.error = None;
        self.phase = Phase::Idle;
    }
}

impl Interaction for FollowUpController {
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
    use docqa_core::types::UnitScore;

    fn answer(text: &str) -> Result<FollowUpResponse, ApiError> {
        Ok(FollowUpResponse { answer: text.into(), citations: vec![1], confidence: UnitScore::new(0.9) })
    }

    #[test]
    fn question_requires_a_document() {
        let mut c = FollowUpController::new();
        assert_eq!(c.begin("中心距？", VlmModel::Gpt4o), Err(ValidationError::NoActiveDocument));
        assert_eq!(c.phase(), Phase::Failed);
    }

    #[test]
    fn answers_append_in_order() {
        let mut c = FollowUpController::new();
        c.set_document(Some("1".into()));
        for (q, a) in [("中心距？", "42mm"), ("材质？", "6061-T6")] {
            let ticket = c.begin(q, VlmModel::QwenVl).unwrap();
            assert_eq!(ticket.request.document_id, "1");
            c.complete(ticket, answer(a));
        }
        let answers: Vec<&str> = c.history().iter().map(|h| h.answer.as_str()).collect();
        assert_eq!(answers, vec!["42mm", "6061-T6"]);
    }

    #[test]
    fn reselecting_same_document_keeps_history() {
        let mut c = FollowUpController::new();
        c.set_document(Some("1".into()));
        let ticket = c.begin("q", VlmModel::Gpt4o).unwrap();
        c.complete(ticket, answer("a"));
        c.set_document(Some("1".into()));
        assert_eq!(c.history().len(), 1);
    }

    #[test]
    fn failure_keeps_earlier_history() {
        let mut c = FollowUpController::new();
        c.set_document(Some("1".into()));
        let ticket = c.begin("q", VlmModel::Gpt4o).unwrap();
        c.complete(ticket, answer("a"));
        let ticket = c.begin("q2", VlmModel::Gpt4o).unwrap();
        c.complete(ticket, Err(ApiError::transport("down")));
        assert_eq!(c.phase(), Phase::Failed);
        assert_eq!(c.history().len(), 1);
    }

    #[test]
    fn overlapping_questions_keep_their_own_answers() {
        let mut c = FollowUpController::new();
        c.set_document(Some("1".into()));
        let first = c.begin("中心距？", VlmModel::Gpt4o).unwrap();
        let second = c.begin("材质？", VlmModel::Gpt4o).unwrap();
        c.complete(second, answer("6061-T6"));
        c.complete(first, answer("42mm"));
        let pairs: Vec<(&str, &str)> =
            c.history().iter().map(|h| (h.question.as_str(), h.answer.as_str())).collect();
        assert_eq!(pairs, vec![("材质？", "6061-T6"), ("中心距？", "42mm")]);
        assert_eq!(c.phase(), Phase::Succeeded);
    }

    #[test]
    fn answer_after_clear_is_dropped() {
        let mut c = FollowUpController::new();
        c.set_document(Some("1".into()));
        let ticket = c.begin("中心距？", VlmModel::Gpt4o).unwrap();
        c.clear();
        assert_eq!(c.complete(ticket, answer("42mm")), Phase::Idle);
        assert!(c.history().is_empty());
        assert_eq!(c.document(), Some("1"));
    }
}
