use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use docqa_core::config::QaSettings;
use docqa_core::types::{AskRequest, AskResponse, QaSource, QueryType, UnitScore};
use docqa_core::validate::non_blank;
use docqa_core::{ApiError, Backend, ValidationError};

use crate::phase::{ControllerError, Interaction, Phase};

/// Confidence bands shown next to a direct answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn of(score: UnitScore) -> Self {
        match score.value() {
            v if v >= 0.7 => ConfidenceBand::High,
            v if v >= 0.4 => ConfidenceBand::Medium,
            _ => ConfidenceBand::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConfidenceBand::High => "高",
            ConfidenceBand::Medium => "中",
            ConfidenceBand::Low => "低",
        }
    }

    /// Advisory shown under low-confidence answers.
    pub fn advisory(self) -> Option<&'static str> {
        match self {
            ConfidenceBand::Low => Some("该答案的置信度较低，建议参考更多来源信息或重新描述问题。"),
            _ => None,
        }
    }
}

/// Direct-answer QA: one question in, a synthesized answer plus ordered sources out.
#[derive(Debug, Clone)]
pub struct AnswerController {
    top_k: usize,
    phase: Phase,
    error: Option<ControllerError>,
    question: Option<String>,
    response: Option<AskResponse>,
}

impl AnswerController {
    pub fn new(settings: &QaSettings) -> Self {
        Self { top_k: settings.top_k, phase: Phase::Idle, error: None, question: None, response: None }
    }

    pub fn begin(
        &mut self,
        question: &str,
        filters: Option<Map<String, Value>>,
    ) -> Result<AskRequest, ValidationError> {
        let question = match non_blank(question, ValidationError::EmptyQuestion) {
            Ok(q) => q.to_string(),
            Err(e) => {
                self.phase = Phase::Failed;
                self.error = Some(e.clone().into());
                return Err(e);
            }
        };
        self.phase = Phase::Pending;
        self.question = Some(question.clone());
        Ok(AskRequest { question, filters, top_k: Some(self.top_k) })
    }

    pub fn complete(&mut self, outcome: Result<AskResponse, ApiError>) -> Phase {
        match outcome {
            Ok(response) => {
                info!(
                    sources = response.sources.len(),
                    confidence = response.confidence.value(),
                    query_type = response.query_type.label(),
                    "answer received"
                );
                self.response = Some(response);
                self.error = None;
                self.phase = Phase::Succeeded;
            }
            Err(err) => {
                warn!(status = err.status_code, message = %err.message, "ask failed");
                self.response = None;
                self.error = Some(ControllerError::from_api(err, "Failed to get an answer"));
                self.phase = Phase::Failed;
            }
        }
        self.phase
    }

    pub async fn ask<B: Backend + ?Sized>(&mut self, backend: &B, question: &str) -> Phase {
        let Ok(request) = self.begin(question, None) else {
            return self.phase;
        };
        debug!(question = %request.question, "asking");
        let outcome = backend.ask(&request).await;
        self.complete(outcome)
    }

    /// The question as it was submitted, echoed above the answer.
    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }

    pub fn response(&self) -> Option<&AskResponse> {
        self.response.as_ref()
    }

    pub fn answer(&self) -> Option<&str> {
        self.response.as_ref().map(|r| r.answer.as_str())
    }

    /// Sources in response order; the display citation is index + 1.
    pub fn sources(&self) -> &[QaSource] {
        self.response.as_ref().map(|r| r.sources.as_slice()).unwrap_or_default()
    }

    pub fn query_type(&self) -> Option<QueryType> {
        self.response.as_ref().map(|r| r.query_type)
    }

    pub fn confidence(&self) -> Option<ConfidenceBand> {
        self.response.as_ref().map(|r| ConfidenceBand::of(r.confidence))
    }

    pub fn clear(&mut self) {
        self.phase = Phase::Idle;
        self.error = None;
        self.question = None;
        self.response = None;
    }
}

impl Interaction for AnswerController {
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

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(ConfidenceBand::of(UnitScore::new(0.7)), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::of(UnitScore::new(0.69)), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::of(UnitScore::new(0.4)), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::of(UnitScore::new(0.39)), ConfidenceBand::Low);
        assert!(ConfidenceBand::Low.advisory().is_some());
        assert!(ConfidenceBand::High.advisory().is_none());
    }

    #[test]
    fn request_uses_configured_top_k() {
        let mut c = AnswerController::new(&ClientSettings::default().qa);
        let req = c.begin(" 卧室有几个窗户？ ", None).unwrap();
        assert_eq!(req.top_k, Some(3));
        assert_eq!(req.question, "卧室有几个窗户？");
        assert_eq!(c.question(), Some("卧室有几个窗户？"));
    }

    #[test]
    fn failure_drops_previous_answer() {
        let mut c = AnswerController::new(&ClientSettings::default().qa);
        c.begin("q", None).unwrap();
        c.complete(Ok(AskResponse {
            answer: "a".into(),
            sources: Vec::new(),
            confidence: UnitScore::new(0.9),
            query_type: QueryType::ExactQuery,
        }));
        assert_eq!(c.answer(), Some("a"));
        c.begin("q2", None).unwrap();
        c.complete(Err(ApiError::transport("timeout")));
        assert!(c.answer().is_none());
        assert!(c.sources().is_empty());
        assert_eq!(c.phase(), Phase::Failed);
    }
}
