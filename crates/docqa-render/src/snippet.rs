//! Two-pass snippet tokenizer.
//!
//! Pass 1 cuts out the first balanced `{...}` block and parses it as JSON. Pass 2
//! runs link extraction on the text before and after it independently. If the
//! block is missing, unbalanced or not valid JSON, the whole snippet goes through
//! link extraction as plain text.
use std::ops::Range;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::links::split_links;
use crate::segment::Segment;
use crate::structured::first_balanced_block;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSnippet {
    pub segments: Vec<Segment>,
    has_block: bool,
}

impl RenderedSnippet {
    /// Whether a structured block was found and parsed.
    pub fn has_block(&self) -> bool {
        self.has_block
    }

    pub fn block(&self) -> Option<&Value> {
        self.segments.iter().find_map(|s| match s {
            Segment::Structured { value, .. } => Some(value),
            _ => None,
        })
    }

    /// Everything shown on screen, in order, with link targets dropped.
    pub fn display_text(&self) -> String {
        self.segments.iter().map(Segment::display_text).collect()
    }

    /// Reassemble the original snippet.
    pub fn source_text(&self) -> String {
        self.segments.iter().map(Segment::source_text).collect()
    }
}

#[derive(Debug, Error)]
enum RenderError {
    #[error("no balanced block")]
    NoBlock,
    #[error("embedded block is not valid JSON: {0}")]
    InvalidBlock(#[from] serde_json::Error),
}

fn extract_block(text: &str) -> Result<(Range<usize>, Value), RenderError> {
    let range = first_balanced_block(text).ok_or(RenderError::NoBlock)?;
    let value = serde_json::from_str(&text[range.clone()])?;
    Ok((range, value))
}

pub fn render_snippet(text: &str) -> RenderedSnippet {
    let (range, value) = match extract_block(text) {
        Ok(found) => found,
        Err(RenderError::NoBlock) => return plain(text),
        Err(e) => {
            debug!(error = %e, "rendering snippet as text");
            return plain(text);
        }
    };

    let mut segments = split_links(&text[..range.start]);
    segments.push(Segment::Structured { raw: text[range.clone()].to_string(), value });
    segments.extend(split_links(&text[range.end..]));
    RenderedSnippet { segments, has_block: true }
}

fn plain(text: &str) -> RenderedSnippet {
    RenderedSnippet { segments: split_links(text), has_block: false }
}
