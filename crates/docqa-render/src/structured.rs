//! Locating the embedded `{...}` fact block by depth counting.
use std::ops::Range;

/// Byte range of the first balanced `{...}` in `text`, starting at the first `{`.
///
/// Braces inside JSON string literals do not count. Returns `None` when there is
/// no `{` or the first one never closes.
pub fn first_balanced_block(text: &str) -> Option<Range<usize>> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start..start + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}
