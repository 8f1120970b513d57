use serde_json::Value;

/// One displayable piece of a rendered snippet.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    /// `text` is displayed; `url` is navigation metadata only.
    Link { text: String, url: String },
    /// The embedded fact block, kept at the position it occupied in the source.
    Structured { raw: String, value: Value },
}

impl Segment {
    /// Characters this segment puts on screen.
    pub fn display_text(&self) -> &str {
        match self {
            Segment::Text(text) | Segment::Link { text, .. } => text,
            Segment::Structured { raw, .. } => raw,
        }
    }

    /// The source text this segment was cut from.
    pub fn source_text(&self) -> String {
        match self {
            Segment::Text(text) => text.clone(),
            Segment::Link { text, url } => format!("[{text}]({url})"),
            Segment::Structured { raw, .. } => raw.clone(),
        }
    }

    /// Indented rendering of a structured block; other segments return `None`.
    pub fn pretty_block(&self) -> Option<String> {
        match self {
            Segment::Structured { value, raw } => {
                Some(serde_json::to_string_pretty(value).unwrap_or_else(|_| raw.clone()))
            }
            _ => None,
        }
    }
}
