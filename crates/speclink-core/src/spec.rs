//! Spec identifiers declared in markdown documents
//!
//! A spec document declares identifiers through its headings:
//!
//! ```markdown
//! # cache
//!
//! ## evict
//! Entries are evicted least recently used first.
//! ```
//!
//! declares `cache.evict`. A level-1 heading that is a valid identifier sets
//! the namespace for the level-2 headings below it; a level-1 heading that
//! is not clears it. Level-2 headings that are not valid identifiers are
//! ordinary prose.

use crate::position::{LineIndex, render_location};
use eyre::{Result, WrapErr};
use facet::Facet;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag as MdTag, TagEnd};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Whether `id` is made only of ASCII letters, digits, `_`, `.` and `-`.
pub fn is_valid_spec_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-'))
}

/// A spec declared by a heading
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct SpecEntry {
    pub id: String,
    /// Heading text as written
    pub title: String,
    /// Paragraphs between the heading and the next heading
    pub description: String,
    pub file: PathBuf,
    pub line: usize,
    /// `path:line:column` of the heading
    pub location: String,
}

/// All specs declared by one markdown document
#[derive(Debug, Clone, Facet)]
pub struct SpecDocument {
    pub path: PathBuf,
    pub specs: Vec<SpecEntry>,
}

impl SpecDocument {
    /// Parse the headings of `markdown`.
    pub fn parse(path: impl Into<PathBuf>, markdown: &str) -> Self {
        let path = path.into();
        let lines = LineIndex::new(markdown);
        let mut specs: Vec<SpecEntry> = Vec::new();

        let mut namespace: Option<String> = None;
        // (level, offset, text) of the heading being read
        let mut heading: Option<(HeadingLevel, usize, String)> = None;
        // spec whose description is being collected
        let mut current: Option<usize> = None;
        let mut paragraph: Option<String> = None;

        for (event, range) in Parser::new_ext(markdown, Options::empty()).into_offset_iter() {
            match event {
                Event::Start(MdTag::Heading { level, .. }) => {
                    heading = Some((level, range.start, String::new()));
                    current = None;
                }
                Event::End(TagEnd::Heading(_)) => {
                    let Some((level, offset, text)) = heading.take() else {
                        continue;
                    };
                    let title = text.trim();
                    match level {
                        HeadingLevel::H1 => {
                            namespace = is_valid_spec_id(title).then(|| title.to_string());
                        }
                        HeadingLevel::H2 if is_valid_spec_id(title) => {
                            let id = match &namespace {
                                Some(ns) => format!("{ns}.{title}"),
                                None => title.to_string(),
                            };
                            let position = lines.position(markdown, offset);
                            current = Some(specs.len());
                            specs.push(SpecEntry {
                                id,
                                title: title.to_string(),
                                description: String::new(),
                                file: path.clone(),
                                line: position.line,
                                location: render_location(&path, position),
                            });
                        }
                        _ => {}
                    }
                }
                Event::Start(MdTag::Paragraph) if current.is_some() => {
                    paragraph = Some(String::new());
                }
                Event::End(TagEnd::Paragraph) => {
                    if let (Some(text), Some(idx)) = (paragraph.take(), current) {
                        let description = &mut specs[idx].description;
                        if !description.is_empty() {
                            description.push_str("\n\n");
                        }
                        description.push_str(text.trim());
                    }
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some((_, _, buf)) = heading.as_mut() {
                        buf.push_str(&text);
                    } else if let Some(buf) = paragraph.as_mut() {
                        buf.push_str(&text);
                    }
                }
                Event::SoftBreak | Event::HardBreak => {
                    if let Some(buf) = paragraph.as_mut() {
                        buf.push(' ');
                    }
                }
                _ => {}
            }
        }

        debug!(path = %path.display(), specs = specs.len(), "parsed spec document");
        Self { path, specs }
    }

    /// Read and parse a markdown file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let markdown = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read spec document {}", path.display()))?;
        Ok(Self::parse(path, &markdown))
    }
}

/// The same identifier declared twice
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Duplicate {
    pub id: String,
    /// Location of the declaration that was kept
    pub first: String,
    pub second: String,
}

/// Every spec known to a project, by identifier
#[derive(Debug, Clone, Default, Facet)]
pub struct SpecIndex {
    pub specs: BTreeMap<String, SpecEntry>,
    pub duplicates: Vec<Duplicate>,
}

impl SpecIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a document's specs; the first declaration of an id wins.
    pub fn add(&mut self, document: SpecDocument) {
        for entry in document.specs {
            match self.specs.get(&entry.id) {
                Some(first) => self.duplicates.push(Duplicate {
                    id: entry.id.clone(),
                    first: first.location.clone(),
                    second: entry.location,
                }),
                None => {
                    self.specs.insert(entry.id.clone(), entry);
                }
            }
        }
    }

    pub fn from_documents(documents: impl IntoIterator<Item = SpecDocument>) -> Self {
        let mut index = Self::new();
        for document in documents {
            index.add(document);
        }
        index
    }

    /// Load every markdown file under `root` matching one of `patterns`.
    #[cfg(feature = "walk")]
    pub fn load(root: impl Into<PathBuf>, patterns: &[String]) -> Result<Self> {
        let walk = crate::sources::WalkSources::new(root).include(patterns.iter().cloned());
        let mut index = Self::new();
        if patterns.is_empty() {
            return Ok(index);
        }
        for (disk_path, relative) in walk.files(|_| true)? {
            let markdown = std::fs::read_to_string(&disk_path)
                .wrap_err_with(|| format!("Failed to read spec document {}", disk_path.display()))?;
            index.add(SpecDocument::parse(relative, &markdown));
        }
        Ok(index)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.specs.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&SpecEntry> {
        self.specs.get(id)
    }

    /// Identifiers in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_spec_ids() {
        assert!(is_valid_spec_id("cache.evict"));
        assert!(is_valid_spec_id("a-b_c.1"));
        assert!(!is_valid_spec_id(""));
        assert!(!is_valid_spec_id("has space"));
        assert!(!is_valid_spec_id("foo(bar"));
        assert!(!is_valid_spec_id("ü"));
    }

    #[test]
    fn test_namespaced_headings() {
        let markdown = "# cache\n\nIntro text.\n\n## evict\nEntries are evicted\nin LRU order.\n\nSecond paragraph.\n\n## load\n";
        let doc = SpecDocument::parse("docs/cache.md", markdown);

        let ids: Vec<&str> = doc.specs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["cache.evict", "cache.load"]);
        assert_eq!(
            doc.specs[0].description,
            "Entries are evicted in LRU order.\n\nSecond paragraph."
        );
        assert_eq!(doc.specs[0].line, 5);
        assert_eq!(doc.specs[0].location, "docs/cache.md:5:1");
        assert_eq!(doc.specs[1].description, "");
    }

    #[test]
    fn test_prose_headings_are_ignored() {
        let markdown = "# Cache Design\n\n## evict\n\n## How it works\n\ntext\n";
        let doc = SpecDocument::parse("x.md", markdown);
        let ids: Vec<&str> = doc.specs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["evict"]);
        // the prose heading ends the description
        assert_eq!(doc.specs[0].description, "");
    }

    #[test]
    fn test_code_heading_and_code_blocks() {
        let markdown = "## `net.retry`\nRetries `3` times.\n\n```\n## not.a.spec\n```\n";
        let doc = SpecDocument::parse("x.md", markdown);
        assert_eq!(doc.specs.len(), 1);
        assert_eq!(doc.specs[0].id, "net.retry");
        assert_eq!(doc.specs[0].description, "Retries 3 times.");
    }

    #[test]
    fn test_index_reports_duplicates() {
        let a = SpecDocument::parse("a.md", "## one\n\n## two\n");
        let b = SpecDocument::parse("b.md", "## two\n");
        let index = SpecIndex::from_documents([a, b]);

        assert_eq!(index.len(), 2);
        assert!(index.contains("two"));
        assert_eq!(index.get("two").map(|s| s.file.as_path()), Some(Path::new("a.md")));
        assert_eq!(
            index.duplicates,
            [Duplicate {
                id: "two".into(),
                first: "a.md:3:1".into(),
                second: "b.md:1:1".into(),
            }]
        );
        assert_eq!(index.ids().collect::<Vec<_>>(), ["one", "two"]);
    }

    #[cfg(feature = "walk")]
    #[test]
    fn test_load_from_globs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/a.md"), "# a\n## one\n").unwrap();
        std::fs::write(dir.path().join("README.md"), "## readme\n").unwrap();

        let index = SpecIndex::load(dir.path(), &["docs/**/*.md".to_string()]).unwrap();
        assert_eq!(index.ids().collect::<Vec<_>>(), ["a.one"]);
        assert_eq!(index.get("a.one").unwrap().location, "docs/a.md:2:1");
    }
}
