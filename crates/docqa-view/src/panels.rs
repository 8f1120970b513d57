//! Read-only view models built from controller state on demand.
use docqa_controllers::ConfidenceBand;
use docqa_core::types::{Percent, QaHistoryItem, QaSource, QueryType, SearchResult, StructuredData};
use docqa_render::RenderedSnippet;

/// Placeholder for results without a page label.
pub const NO_PAGE: &str = "N/A";

/// Provenance for the selected search result.
#[derive(Debug, Clone)]
pub struct ProvenancePanel<'a> {
    pub result: &'a SearchResult,
    pub snippet: RenderedSnippet,
    pub preview_url: String,
    pub thumbnail_url: String,
    pub history: &'a [QaHistoryItem],
}

impl<'a> ProvenancePanel<'a> {
    pub fn citation(&self) -> u32 {
        self.result.citation_number
    }

    pub fn page(&self) -> &'a str {
        self.result.page.as_deref().filter(|p| !p.trim().is_empty()).unwrap_or(NO_PAGE)
    }

    /// Extracted pairs worth showing; blank labels or values are skipped.
    pub fn structured(&self) -> Vec<&'a StructuredData> {
        self.result.structured_data.iter().filter(|d| d.is_displayable()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct SourceRow<'a> {
    pub citation: u32,
    /// The answer text carries a `[n]` marker for this row.
    pub cited: bool,
    pub source: &'a QaSource,
    pub similarity: Percent,
    pub chunk: Option<RenderedSnippet>,
}

/// Sources backing a direct answer. Only built when there is at least one.
#[derive(Debug, Clone)]
pub struct SourcePanel<'a> {
    pub rows: Vec<SourceRow<'a>>,
}

#[derive(Debug, Clone)]
pub struct AnswerPanel<'a> {
    pub question: &'a str,
    pub answer: &'a str,
    pub query_type: QueryType,
    pub confidence: Percent,
    pub band: ConfidenceBand,
    /// `[n]` markers found in the answer, in order.
    pub cited: Vec<u32>,
}

impl AnswerPanel<'_> {
    pub fn query_type_label(&self) -> &'static str {
        self.query_type.label()
    }

    pub fn advisory(&self) -> Option<&'static str> {
        self.band.advisory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::types::{FileType, ThumbnailType};
    use docqa_render::render_snippet;

    fn result(page: Option<&str>) -> SearchResult {
        SearchResult {
            id: "7".into(),
            file_name: "PlantFlow_v3_arch.pdf".into(),
            file_path: "/研发架构/".into(),
            file_type: FileType::Architecture,
            similarity: Percent::new(82),
            page: page.map(str::to_string),
            date: "2025-08-15".into(),
            snippet: String::new(),
            citation_number: 4,
            thumbnail_type: ThumbnailType::Pdf,
            thumbnail_url: None,
            preview_url: None,
            version: "v3.0".into(),
            structured_data: vec![
                StructuredData { label: "模块".into(), value: "消息队列".into() },
                StructuredData { label: "".into(), value: "orphan".into() },
            ],
        }
    }

    fn panel(result: &SearchResult) -> ProvenancePanel<'_> {
        ProvenancePanel {
            result,
            snippet: render_snippet(&result.snippet),
            preview_url: String::new(),
            thumbnail_url: String::new(),
            history: &[],
        }
    }

    #[test]
    fn page_falls_back_to_placeholder() {
        assert_eq!(panel(&result(None)).page(), NO_PAGE);
        assert_eq!(panel(&result(Some(" "))).page(), NO_PAGE);
        assert_eq!(panel(&result(Some("Page 12"))).page(), "Page 12");
    }

    #[test]
    fn blank_structured_pairs_are_hidden() {
        let r = result(None);
        let p = panel(&r);
        assert_eq!(p.citation(), 4);
        assert_eq!(p.structured().len(), 1);
    }
}
