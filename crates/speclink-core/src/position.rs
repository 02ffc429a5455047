//! Offsets, line/column positions and `path:line:column` locations

use facet::Facet;
use std::path::{Path, PathBuf};

/// A resolved position in a source buffer.
///
/// `offset` is a byte offset. `line` and `column` are both 1-indexed, with
/// `column` counted in characters from the start of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
pub struct Position {
    /// Byte offset from start of file
    pub offset: usize,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number in characters (1-indexed)
    pub column: usize,
}

/// Byte offsets of every line start in a buffer.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { line_starts }
    }

    /// 1-indexed line containing `offset`.
    pub fn line(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }

    /// Byte offset where the given 1-indexed line starts.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line.checked_sub(1)?).copied()
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Resolve `offset` against `content`, which must be the buffer this
    /// index was built from.
    pub fn position(&self, content: &str, offset: usize) -> Position {
        let offset = offset.min(content.len());
        let line = self.line(offset);
        let line_start = self.line_starts[line - 1];
        let column = content
            .get(line_start..offset)
            .map_or(offset - line_start, |prefix| prefix.chars().count())
            + 1;
        Position {
            offset,
            line,
            column,
        }
    }
}

/// A file loaded into memory, ready to be scanned.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    content: String,
    lines: LineIndex,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let content = content.into();
        let lines = LineIndex::new(&content);
        Self {
            path: path.into(),
            content,
            lines,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// File extension without the leading dot, if any.
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|ext| ext.to_str())
    }

    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    pub fn position(&self, offset: usize) -> Position {
        self.lines.position(&self.content, offset)
    }

    /// Render `offset` as `path:line:column`.
    pub fn location(&self, offset: usize) -> String {
        render_location(&self.path, self.position(offset))
    }
}

pub fn render_location(path: &Path, position: Position) -> String {
    format!("{}:{}:{}", path.display(), position.line, position.column)
}

/// Split a rendered `path:line:column` back into its parts.
///
/// Splits from the right so paths containing `:` (Windows drives, URLs)
/// survive the round trip.
pub fn parse_location(location: &str) -> Option<(&str, usize, usize)> {
    let mut parts = location.rsplitn(3, ':');
    let column = parts.next()?.parse().ok()?;
    let line = parts.next()?.parse().ok()?;
    let path = parts.next()?;
    if path.is_empty() {
        return None;
    }
    Some((path, line, column))
}
