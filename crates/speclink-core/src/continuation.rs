//! Extending a tag body across the comment lines that follow it
//!
//! A tag with a body may keep going on the next lines:
//!
//! ```text
//! // spec(cache.evict): entries are evicted
//! // least recently used first
//! ```
//!
//! For line comments the next physical line continues the body only when it
//! is a whole-line comment of the same style with non-empty text and no tag
//! of its own. For block comments the remaining lines of the same block
//! continue the body until a blank line or a line carrying a tag.

use crate::grammar::{TagMatch, contains_tag};
use crate::segment::Segment;
use crate::styles::{CommentStyle, longest_match};

/// Lines appended to a body, and where the last one ends.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Continuation {
    pub lines: Vec<String>,
    pub end: usize,
}

impl Continuation {
    /// Append the collected lines to `tag`'s body.
    pub fn apply(self, tag: &mut TagMatch) {
        if self.lines.is_empty() {
            return;
        }
        for line in self.lines {
            tag.body.push('\n');
            tag.body.push_str(&line);
        }
        tag.end = self.end;
    }
}

/// Physical lines of a block comment's interior, as `(offset, text)`.
///
/// Every line but the first has its indentation and one `middle` marker
/// removed; `offset` points at the first remaining byte.
pub fn block_lines<'a>(
    text: &'a str,
    segment: &Segment,
    style: &CommentStyle,
) -> Vec<(usize, &'a str)> {
    let mut lines = Vec::new();
    let mut offset = segment.interior_start;

    for (i, raw) in segment.interior(text).split('\n').enumerate() {
        let stripped = if i == 0 {
            raw
        } else {
            let trimmed = raw.trim_start();
            match style.middle.as_deref() {
                Some(middle) => trimmed.strip_prefix(middle).unwrap_or(trimmed),
                None => trimmed,
            }
        };
        lines.push((offset + raw.len() - stripped.len(), stripped));
        offset += raw.len() + 1;
    }

    lines
}

/// Continue a body through the lines following a line comment.
///
/// `comment_end` is where the tag's comment stops: the `\n` ending its line,
/// or the end of the buffer.
pub fn continue_line_comment(
    text: &str,
    comment_end: usize,
    style: &CommentStyle,
    styles: &[CommentStyle],
    marker: &str,
) -> Continuation {
    let mut continuation = Continuation::default();
    let mut newline = comment_end;

    while newline < text.len() {
        let line_start = newline + 1;
        let line_end = text[line_start..]
            .find('\n')
            .map_or(text.len(), |nl| line_start + nl);
        let line = &text[line_start..line_end];

        // only a whole-line comment of the very same style continues
        let comment_start = line_end - line.trim_start().len();
        if longest_match(styles, text, comment_start) != Some(style) {
            break;
        }

        let interior_start = comment_start + style.start.len();
        let interior = &text[interior_start..line_end];
        let content = interior.trim();
        if content.is_empty() || contains_tag(marker, interior) {
            break;
        }

        let leading = interior.len() - interior.trim_start().len();
        continuation.lines.push(content.to_string());
        continuation.end = interior_start + leading + content.len();
        newline = line_end;
    }

    continuation
}

/// Continue a body through the remaining lines of its block comment.
pub fn continue_block(lines: &[(usize, &str)], marker: &str) -> Continuation {
    let mut continuation = Continuation::default();

    for &(offset, line) in lines {
        let content = line.trim();
        if content.is_empty() || contains_tag(marker, line) {
            break;
        }
        let leading = line.len() - line.trim_start().len();
        continuation.lines.push(content.to_string());
        continuation.end = offset + leading + content.len();
    }

    continuation
}
