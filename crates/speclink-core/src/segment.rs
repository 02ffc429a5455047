//! Finding where a comment ends

use crate::styles::{CommentStyle, StyleKind};

/// Span of one comment's interior within the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// First byte after the start delimiter
    pub interior_start: usize,
    /// First byte of the end delimiter (or the newline / end of file)
    pub interior_end: usize,
    /// First byte after the whole comment, end delimiter included
    pub end: usize,
    /// False for a block comment that runs into end of file
    pub terminated: bool,
}

impl Segment {
    pub fn interior<'a>(&self, text: &'a str) -> &'a str {
        &text[self.interior_start..self.interior_end]
    }
}

/// Delimit the comment whose interior begins at `interior_start`.
///
/// Line comments stop before the next `\n`. Block comments stop at the next
/// occurrence of the style's terminator; an unterminated block runs to the
/// end of the buffer.
pub fn segment(text: &str, interior_start: usize, style: &CommentStyle) -> Segment {
    let rest = &text[interior_start..];
    match style.kind {
        StyleKind::Line => {
            let interior_end = rest
                .find('\n')
                .map_or(text.len(), |nl| interior_start + nl);
            Segment {
                interior_start,
                interior_end,
                end: interior_end,
                terminated: true,
            }
        }
        StyleKind::Block => match rest.find(&*style.end) {
            Some(found) if !style.end.is_empty() => {
                let interior_end = interior_start + found;
                Segment {
                    interior_start,
                    interior_end,
                    end: interior_end + style.end.len(),
                    terminated: true,
                }
            }
            _ => Segment {
                interior_start,
                interior_end: text.len(),
                end: text.len(),
                terminated: false,
            },
        },
    }
}
