//! Source providers for tag scanning

use crate::position::SourceFile;
use crate::scanner::{Scanner, Tag, Tags};
use eyre::{Result, WrapErr};
use std::path::PathBuf;
#[cfg(feature = "walk")]
use std::path::Path;
use tracing::debug;

/// Tags from a set of files, plus anything worth telling the user about.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub tags: Tags,
    pub warnings: Vec<String>,
    pub files_scanned: usize,
}

/// Trait for providing source files to scan
pub trait Sources {
    /// Scan every file of this source. Tags are ordered by file, then offset.
    fn scan(self, scanner: &Scanner) -> Result<ScanResult>;
}

/// In-memory sources (useful for testing, embedding, etc.)
#[derive(Debug, Default)]
pub struct MemorySources(Vec<SourceFile>);

impl MemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with content
    pub fn add(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.0.push(SourceFile::new(path, content));
        self
    }
}

impl Sources for MemorySources {
    fn scan(self, scanner: &Scanner) -> Result<ScanResult> {
        let mut result = ScanResult::default();
        for file in &self.0 {
            result.tags.extend(scanner.scan(file));
            result.files_scanned += 1;
        }
        result.tags.sort();
        Ok(result)
    }
}

/// Sources from an explicit list of file paths
///
/// Every path is scanned with the styles of its extension, and a file that
/// cannot be read fails the whole scan.
#[derive(Debug)]
pub struct PathSources(Vec<PathBuf>);

impl PathSources {
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self(paths.into_iter().map(Into::into).collect())
    }
}

impl Sources for PathSources {
    fn scan(self, scanner: &Scanner) -> Result<ScanResult> {
        let files: Vec<(PathBuf, PathBuf)> = self.0.into_iter().map(|p| (p.clone(), p)).collect();
        let mut result = ScanResult {
            files_scanned: files.len(),
            ..ScanResult::default()
        };
        for tags in scan_files(scanner, &files) {
            result.tags.extend(tags?);
        }
        result.tags.sort();
        Ok(result)
    }
}

/// Gitignore-aware directory walker
///
/// Tags carry paths relative to the walk root.
#[cfg(feature = "walk")]
#[derive(Debug)]
pub struct WalkSources {
    root: PathBuf,
    include: Vec<String>,
    exclude: Vec<String>,
}

#[cfg(feature = "walk")]
impl WalkSources {
    /// Create a walker for the given root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Add include patterns (e.g., `["src/**"]`); no patterns means everything
    pub fn include(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.include.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Add exclude patterns (e.g., `["target/**"]`)
    pub fn exclude(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Every file under the root that matches the patterns and that `accept`
    /// agrees to, as `(path on disk, path relative to root)`.
    pub(crate) fn files(
        &self,
        accept: impl Fn(&Path) -> bool,
    ) -> Result<Vec<(PathBuf, PathBuf)>> {
        use ignore::WalkBuilder;

        let include = build_globset(&self.include)?;
        let exclude = build_globset(&self.exclude)?;

        let walker = WalkBuilder::new(&self.root)
            .follow_links(true)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!("skipping unreadable entry: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            if !self.include.is_empty() && !include.is_match(relative) {
                continue;
            }
            if exclude.is_match(relative) || !accept(relative) {
                continue;
            }
            files.push((path.to_path_buf(), relative.to_path_buf()));
        }

        files.sort();
        Ok(files)
    }
}

#[cfg(feature = "walk")]
impl Sources for WalkSources {
    fn scan(self, scanner: &Scanner) -> Result<ScanResult> {
        let registry = scanner.registry();
        let files = self.files(|path| {
            registry.scans(path.extension().and_then(|ext| ext.to_str()))
        })?;
        debug!(root = %self.root.display(), files = files.len(), "walked sources");

        let mut result = ScanResult::default();
        for (tags, (disk_path, _)) in scan_files(scanner, &files).into_iter().zip(&files) {
            match tags {
                Ok(tags) => {
                    result.tags.extend(tags);
                    result.files_scanned += 1;
                }
                // binary or non-UTF-8 files are not worth failing over
                Err(err) => result
                    .warnings
                    .push(format!("Skipped {}: {:#}", disk_path.display(), err)),
            }
        }

        result.tags.sort();
        Ok(result)
    }
}

#[cfg(feature = "walk")]
pub(crate) fn build_globset(patterns: &[String]) -> Result<globset::GlobSet> {
    let mut builder = globset::GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.replace('\\', "/");
        let glob = globset::Glob::new(&pattern)
            .wrap_err_with(|| format!("Invalid glob pattern '{}'", pattern))?;
        builder.add(glob);
    }
    builder.build().wrap_err("Failed to build glob set")
}

/// Read and scan `(path on disk, path reported in tags)` pairs.
fn scan_files(scanner: &Scanner, files: &[(PathBuf, PathBuf)]) -> Vec<Result<Vec<Tag>>> {
    let scan_one = |(disk_path, display_path): &(PathBuf, PathBuf)| -> Result<Vec<Tag>> {
        let content = std::fs::read_to_string(disk_path)
            .wrap_err_with(|| format!("Failed to read {}", disk_path.display()))?;
        let tags = scanner.scan(&SourceFile::new(display_path.clone(), content));
        debug!(file = %display_path.display(), tags = tags.len(), "scanned");
        Ok(tags)
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        files.par_iter().map(scan_one).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        files.iter().map(scan_one).collect()
    }
}
