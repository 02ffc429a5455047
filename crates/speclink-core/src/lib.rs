//! speclink-core - Core library for linking source code to specs
//!
//! This crate provides the building blocks for:
//! - Finding `spec(identifier): body` tags inside comments of many languages
//! - Reading spec identifiers declared by markdown headings
//! - Cross-referencing the two into a coverage report
//!
//! # Features
//!
//! - `walk` - Enable [`WalkSources`] for gitignore-aware directory walking (brings in `ignore` and `globset`)
//! - `parallel` - Scan files in parallel (brings in `rayon`)
//!
//! # Tags
//!
//! A tag is a marker word followed by an identifier in parentheses, and
//! optionally a colon and a body that may continue on following comment
//! lines:
//!
//! ```text
//! // spec(cache.evict): entries are evicted
//! // least recently used first
//! # spec(cli.exit-code)
//! /* spec(net.retry): at most three times */
//! ```
//!
//! Which comment syntaxes are recognized depends on the file extension; see
//! [`StyleRegistry::builtin`].
//!
//! ```
//! use speclink_core::{Scanner, SourceFile};
//!
//! let file = SourceFile::new("src/cache.rs", "fn evict() {} // spec(cache.evict): LRU");
//! let tags = Scanner::new("spec").scan(&file);
//!
//! assert_eq!(tags.len(), 1);
//! assert_eq!(tags[0].id, "cache.evict");
//! assert_eq!(tags[0].body, "LRU");
//! assert_eq!(tags[0].location, "src/cache.rs:1:18");
//! ```
//!
//! # Sources
//!
//! Use [`MemorySources`] when you don't want to hit the filesystem:
//!
//! ```
//! use speclink_core::{MemorySources, Scanner, Tags};
//!
//! let result = Tags::extract(
//!     MemorySources::new()
//!         .add("foo.py", "# spec(test.one)")
//!         .add("bar.sql", "-- spec(test.two)"),
//!     &Scanner::new("spec"),
//! )
//! .unwrap();
//!
//! assert_eq!(result.tags.len(), 2);
//! ```
//!
//! and [`WalkSources`] to scan a directory tree:
//!
//! ```ignore
//! use speclink_core::{CoverageReport, Scanner, SpecIndex, Tags, WalkSources};
//!
//! let result = Tags::extract(
//!     WalkSources::new(".").exclude(["target/**"]),
//!     &Scanner::new("spec"),
//! )?;
//! let specs = SpecIndex::load(".", &["docs/**/*.md".to_string()])?;
//! let report = CoverageReport::compute(&specs, &result.tags);
//! println!("Coverage: {:.1}%", report.coverage_percent());
//! ```

mod continuation;
mod coverage;
mod grammar;
pub mod position;
mod scanner;
mod segment;
mod sources;
mod spec;
pub mod styles;

pub use coverage::CoverageReport;
pub use position::{LineIndex, Position, SourceFile, parse_location, render_location};
pub use scanner::{Scanner, Tag, Tags};
pub use sources::{MemorySources, PathSources, ScanResult, Sources};
pub use spec::{Duplicate, SpecDocument, SpecEntry, SpecIndex, is_valid_spec_id};
pub use styles::{CommentStyle, Fallback, StyleKind, StyleRegistry};

#[cfg(feature = "walk")]
pub use sources::WalkSources;
