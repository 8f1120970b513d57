//! Markdown-style `[anchor](target)` links.
//!
//! Matches the same spans as `\[([^\]]+)\]\(([^)]+)\)` applied left to right:
//! the anchor runs to the first `]`, which must be followed directly by `(`,
//! and the target runs to the first `)`. Neither may be empty.
use crate::segment::Segment;

struct Link<'a> {
    anchor: &'a str,
    target: &'a str,
    end: usize,
}

fn link_at(text: &str, open: usize) -> Option<Link<'_>> {
    let after = &text[open + 1..];
    let close = after.find(']')?;
    if close == 0 {
        return None;
    }
    let rest = after[close + 1..].strip_prefix('(')?;
    let paren = rest.find(')')?;
    if paren == 0 {
        return None;
    }
    Some(Link {
        anchor: &after[..close],
        target: &rest[..paren],
        // '[' + anchor + "](" + target + ')'
        end: open + 1 + close + 2 + paren + 1,
    })
}

/// Split `text` into plain and link segments, in source order.
pub fn split_links(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find('[') {
        let open = cursor + offset;
        match link_at(text, open) {
            Some(link) => {
                if open > plain_start {
                    segments.push(Segment::Text(text[plain_start..open].to_string()));
                }
                segments.push(Segment::Link { text: link.anchor.to_string(), url: link.target.to_string() });
                plain_start = link.end;
                cursor = link.end;
            }
            None => cursor = open + 1,
        }
    }
    if plain_start < text.len() {
        segments.push(Segment::Text(text[plain_start..].to_string()));
    }
    segments
}

/// Numbers of `[n]` citation markers in `text`, in order of appearance. A marker
/// that opens a link (`[1](...)`) is not a citation.
pub fn citation_markers(text: &str) -> Vec<u32> {
    let mut found = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = text[cursor..].find('[') {
        let open = cursor + offset;
        cursor = open + 1;
        let Some(close) = text[open + 1..].find(']') else {
            break;
        };
        let inner = &text[open + 1..open + 1 + close];
        let is_link = text[open + 1 + close + 1..].starts_with('(');
        if is_link || inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        if let Ok(n) = inner.parse() {
            found.push(n);
        }
    }
    found
}
