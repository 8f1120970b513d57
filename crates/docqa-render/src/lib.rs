//! docqa-render
//!
//! Turns raw snippet text into display segments: markdown links, one embedded
//! JSON fact block, and highlighted domain terms. Rendering never fails; input
//! that cannot be parsed is shown as plain text.
pub mod highlight;
pub mod links;
pub mod segment;
pub mod snippet;
pub mod structured;

pub use highlight::{Highlighter, Span};
pub use links::{citation_markers, split_links};
pub use segment::Segment;
pub use snippet::{render_snippet, RenderedSnippet};

/// Snippet tokenizer plus the configured keyword highlighter.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    highlighter: Highlighter,
}

impl Renderer {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { highlighter: Highlighter::new(keywords) }
    }

    pub fn snippet(&self, text: &str) -> RenderedSnippet {
        render_snippet(text)
    }

    /// Highlight spans for a plain-text segment. Link anchors and structured
    /// blocks are not highlighted.
    pub fn highlight<'a>(&self, text: &'a str) -> Vec<Span<'a>> {
        self.highlighter.spans(text)
    }

    pub fn keywords(&self) -> &[String] {
        self.highlighter.terms()
    }
}
