//! Keyword highlighting over plain text.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span<'a> {
    Plain(&'a str),
    Mark(&'a str),
}

impl<'a> Span<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Span::Plain(s) | Span::Mark(s) => s,
        }
    }
}

/// Case-sensitive, greedy, left-to-right term marker. At each position the longest
/// matching term wins, and scanning resumes after it, so marks never overlap.
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    terms: Vec<String>,
}

impl Highlighter {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut terms: Vec<String> = terms.into_iter().map(Into::into).filter(|t| !t.is_empty()).collect();
        terms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        terms.dedup();
        Self { terms }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn spans<'a>(&self, text: &'a str) -> Vec<Span<'a>> {
        let mut spans = Vec::new();
        let mut plain_start = 0;
        let mut pos = 0;

        while pos < text.len() {
            let rest = &text[pos..];
            match self.terms.iter().find(|t| rest.starts_with(t.as_str())) {
                Some(term) => {
                    if plain_start < pos {
                        spans.push(Span::Plain(&text[plain_start..pos]));
                    }
                    spans.push(Span::Mark(&text[pos..pos + term.len()]));
                    pos += term.len();
                    plain_start = pos;
                }
                None => pos += rest.chars().next().map_or(1, char::len_utf8),
            }
        }
        if plain_start < text.len() {
            spans.push(Span::Plain(&text[plain_start..]));
        }
        spans
    }
}
