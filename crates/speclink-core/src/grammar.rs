//! Parser for `marker(identifier): body` tags inside comment text
//!
//! The grammar, applied to a single line of comment text:
//!
//! - the marker must not follow an alphanumeric character or `_`
//! - optional whitespace, then `(`
//! - the identifier is everything up to the first `)`, taken verbatim
//! - if `:` immediately follows `)`, the rest of the text up to the next tag
//!   is the body (trimmed)
//!
//! Anything that does not fit is skipped; scanning resumes right after the
//! marker so one bad occurrence never hides a later tag.

use std::ops::Range;

/// A tag found in one piece of comment text. Offsets are absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch {
    /// Offset of the marker's first byte
    pub start: usize,
    /// Offset just past the body, or past `)` when there is no body
    pub end: usize,
    pub id: String,
    pub body: String,
}

/// `marker(id)` without the body. Offsets are relative to the text.
#[derive(Debug, Clone)]
struct Head {
    start: usize,
    id: Range<usize>,
    /// Just past the closing `)`
    end: usize,
}

/// Find all tags in `text`, which starts at absolute offset `base`.
pub fn find_tags(marker: &str, text: &str, base: usize) -> Vec<TagMatch> {
    let heads = find_heads(marker, text);
    let mut matches = Vec::with_capacity(heads.len());

    for (i, head) in heads.iter().enumerate() {
        // a body never runs into the next tag on the same text
        let limit = heads.get(i + 1).map_or(text.len(), |next| next.start);

        let (body, end) = match text[head.end..limit].strip_prefix(':') {
            Some(raw) => {
                let leading = raw.len() - raw.trim_start().len();
                let body = raw.trim();
                if body.is_empty() {
                    (String::new(), head.end)
                } else {
                    let body_start = head.end + 1 + leading;
                    (body.to_string(), body_start + body.len())
                }
            }
            None => (String::new(), head.end),
        };

        matches.push(TagMatch {
            start: base + head.start,
            end: base + end,
            id: text[head.id.clone()].to_string(),
            body,
        });
    }

    matches
}

/// Whether `text` contains at least one well-formed tag.
pub fn contains_tag(marker: &str, text: &str) -> bool {
    let mut from = 0;
    while let Some(found) = text[from..].find(marker) {
        let start = from + found;
        if parse_head(marker, text, start).is_some() {
            return true;
        }
        from = start + marker.len();
    }
    false
}

fn find_heads(marker: &str, text: &str) -> Vec<Head> {
    let mut heads = Vec::new();
    let mut from = 0;

    while let Some(found) = text[from..].find(marker) {
        let start = from + found;
        match parse_head(marker, text, start) {
            Some(head) => {
                from = head.end;
                heads.push(head);
            }
            None => from = start + marker.len(),
        }
    }

    heads
}

fn parse_head(marker: &str, text: &str, start: usize) -> Option<Head> {
    // `myspec(x)` is not a `spec` tag
    let preceded_by_word = text[..start]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_alphanumeric() || c == '_');
    if preceded_by_word {
        return None;
    }

    let after_marker = &text[start + marker.len()..];
    let after_space = after_marker.trim_start();
    if !after_space.starts_with('(') {
        return None;
    }

    let id_start = text.len() - after_space.len() + 1;
    let id_end = id_start + text[id_start..].find(')')?;

    Some(Head {
        start,
        id: id_start..id_end,
        end: id_end + 1,
    })
}
