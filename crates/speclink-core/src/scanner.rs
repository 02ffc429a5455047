//! Scanner: finds every tag inside the comments of one file

use crate::continuation::{block_lines, continue_block, continue_line_comment};
use crate::grammar::{TagMatch, find_tags};
use crate::position::{SourceFile, render_location};
use crate::segment::{Segment, segment};
use crate::sources::{ScanResult, Sources};
use crate::styles::{CommentStyle, StyleKind, StyleRegistry, longest_match};
use facet::Facet;
use std::path::PathBuf;

/// A tag found in a source comment.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Tag {
    /// The marker keyword (e.g. "spec")
    pub name: String,
    /// Raw identifier between the parentheses
    pub id: String,
    /// Text after the colon, lines joined with `\n`; empty if none
    pub body: String,
    /// File the tag was found in
    pub file: PathBuf,
    /// `path:line:column` of the marker
    pub location: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number in characters (1-indexed)
    pub column: usize,
    /// Byte offset of the marker's first character
    pub start_offset: usize,
    /// Byte offset just past the tag
    pub end_offset: usize,
}

/// Finds `marker(id): body` tags inside comments.
///
/// A scanner owns its marker and style registry and holds no other state,
/// so one instance can scan many files, from many threads.
#[derive(Debug, Clone)]
pub struct Scanner {
    marker: String,
    registry: StyleRegistry,
}

impl Scanner {
    /// A scanner using the built-in style registry.
    ///
    /// # Panics
    ///
    /// Panics if `marker` is empty.
    pub fn new(marker: impl Into<String>) -> Self {
        Self::with_registry(marker, StyleRegistry::builtin())
    }

    /// # Panics
    ///
    /// Panics if `marker` is empty.
    pub fn with_registry(marker: impl Into<String>, registry: StyleRegistry) -> Self {
        let marker = marker.into();
        assert!(!marker.is_empty(), "tag marker must not be empty");
        Self { marker, registry }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn registry(&self) -> &StyleRegistry {
        &self.registry
    }

    /// Scan using the styles registered for the file's extension.
    pub fn scan(&self, file: &SourceFile) -> Vec<Tag> {
        let styles = self.registry.styles_for_file(file.extension());
        self.scan_with_styles(file, styles)
    }

    /// Scan using an explicit style list, ignoring the registry.
    ///
    /// Tags come back sorted by offset.
    pub fn scan_with_styles(&self, file: &SourceFile, styles: &[CommentStyle]) -> Vec<Tag> {
        let text = file.content();
        if styles.is_empty() || text.is_empty() {
            return Vec::new();
        }

        // next start of each style at or after the cursor
        let mut next: Vec<Option<usize>> = styles
            .iter()
            .map(|style| next_start(text, 0, style))
            .collect();
        let mut cursor = 0;
        let mut matches = Vec::new();

        loop {
            for (slot, style) in next.iter_mut().zip(styles) {
                if slot.is_some_and(|pos| pos < cursor) {
                    *slot = next_start(text, cursor, style);
                }
            }

            // the earliest comment wins; anything inside it is comment text
            let Some(pos) = next.iter().flatten().min().copied() else {
                break;
            };
            let Some(style) = longest_match(styles, text, pos) else {
                break;
            };

            let seg = segment(text, pos + style.start.len(), style);
            match style.kind {
                StyleKind::Line => self.scan_line_comment(text, &seg, style, styles, &mut matches),
                StyleKind::Block => self.scan_block_comment(text, &seg, style, &mut matches),
            }

            cursor = seg.end.max(pos + 1);
        }

        let mut tags: Vec<Tag> = matches
            .into_iter()
            .map(|m| self.to_tag(file, m))
            .collect();
        tags.sort_by_key(|tag| tag.start_offset);
        tags
    }

    fn scan_line_comment(
        &self,
        text: &str,
        seg: &Segment,
        style: &CommentStyle,
        styles: &[CommentStyle],
        out: &mut Vec<TagMatch>,
    ) {
        let mut found = find_tags(&self.marker, seg.interior(text), seg.interior_start);
        if let Some(last) = found.last_mut() {
            if !last.body.is_empty() {
                continue_line_comment(text, seg.end, style, styles, &self.marker).apply(last);
            }
        }
        out.extend(found);
    }

    fn scan_block_comment(
        &self,
        text: &str,
        seg: &Segment,
        style: &CommentStyle,
        out: &mut Vec<TagMatch>,
    ) {
        let lines = block_lines(text, seg, style);
        for (i, &(offset, line)) in lines.iter().enumerate() {
            let mut found = find_tags(&self.marker, line, offset);
            if let Some(last) = found.last_mut() {
                if !last.body.is_empty() {
                    continue_block(&lines[i + 1..], &self.marker).apply(last);
                }
            }
            out.extend(found);
        }
    }

    fn to_tag(&self, file: &SourceFile, m: TagMatch) -> Tag {
        let position = file.position(m.start);
        Tag {
            name: self.marker.clone(),
            id: m.id,
            body: m.body,
            file: file.path().to_path_buf(),
            location: render_location(file.path(), position),
            line: position.line,
            column: position.column,
            start_offset: m.start,
            end_offset: m.end,
        }
    }
}

/// Where the next comment of `style` starts, at or after `from`.
fn next_start(text: &str, from: usize, style: &CommentStyle) -> Option<usize> {
    if !style.is_wildcard() {
        return text[from..].find(&*style.start).map(|found| from + found);
    }

    // wildcard comments start at every line start
    let line_start = if from == 0 || text.as_bytes()[from - 1] == b'\n' {
        from
    } else {
        from + text[from..].find('\n')? + 1
    };
    (line_start < text.len()).then_some(line_start)
}

/// Tags collected from many files.
#[derive(Debug, Clone, Default, Facet)]
pub struct Tags {
    pub tags: Vec<Tag>,
}

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every file of `sources` with `scanner`.
    pub fn extract(sources: impl Sources, scanner: &Scanner) -> eyre::Result<ScanResult> {
        sources.scan(scanner)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.tags.iter()
    }

    /// Merge another collection into this one.
    pub fn extend(&mut self, other: impl IntoIterator<Item = Tag>) {
        self.tags.extend(other);
    }

    /// Order by file, then by position within the file.
    pub fn sort(&mut self) {
        self.tags
            .sort_by(|a, b| (&a.file, a.start_offset).cmp(&(&b.file, b.start_offset)));
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}
