//! Configuration schema for speclink
//!
//! Config lives at `.config/speclink/config.yaml` relative to the project root:
//!
//! ```yaml
//! marker: spec
//! specs:
//!   - docs/**/*.md
//! include:
//!   - src/**
//! exclude:
//!   - target/**
//! scan_unknown: false
//! styles:
//!   - extensions: [tpl]
//!     start: "{#"
//!     end: "#}"
//! ```

use eyre::Result;
use facet::Facet;
use speclink_core::{CommentStyle, Fallback, StyleRegistry};

/// Marker used when the config does not name one
pub const DEFAULT_MARKER: &str = "spec";

/// Exclude patterns used when the config does not list any
pub const DEFAULT_EXCLUDE: &[&str] = &["target/**", "node_modules/**"];

/// Root configuration for speclink
#[derive(Debug, Clone, Default, Facet)]
pub struct Config {
    /// Tag marker word, `spec` if unset
    #[facet(default)]
    pub marker: Option<String>,

    /// Glob patterns for markdown spec documents
    #[facet(default)]
    pub specs: Vec<String>,

    /// Glob patterns for source files; everything if empty
    #[facet(default)]
    pub include: Vec<String>,

    /// Glob patterns to skip; [`DEFAULT_EXCLUDE`] if unset
    #[facet(default)]
    pub exclude: Option<Vec<String>>,

    /// Scan files of unknown type line by line instead of skipping them
    #[facet(default)]
    pub scan_unknown: bool,

    /// Additional comment styles
    #[facet(default)]
    pub styles: Vec<StyleConfig>,
}

/// A comment style added to some extensions
#[derive(Debug, Clone, Facet)]
pub struct StyleConfig {
    /// Extensions without the leading dot
    pub extensions: Vec<String>,

    pub start: String,

    /// Per-line marker inside block comments
    #[facet(default)]
    pub middle: Option<String>,

    /// Block terminator; a line comment if unset
    #[facet(default)]
    pub end: Option<String>,
}

impl Config {
    pub fn marker(&self) -> &str {
        match self.marker.as_deref() {
            Some(marker) if !marker.is_empty() => marker,
            _ => DEFAULT_MARKER,
        }
    }

    pub fn exclude(&self) -> Vec<String> {
        match &self.exclude {
            Some(exclude) => exclude.clone(),
            None => DEFAULT_EXCLUDE.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// The built-in registry with this config's styles and fallback applied.
    pub fn registry(&self) -> Result<StyleRegistry> {
        let fallback = if self.scan_unknown {
            Fallback::Wildcard
        } else {
            Fallback::Skip
        };
        let mut registry = StyleRegistry::builtin().with_fallback(fallback);

        for style in &self.styles {
            if style.start.is_empty() {
                eyre::bail!(
                    "Comment style for [{}] has an empty `start`",
                    style.extensions.join(", ")
                );
            }
            let extensions = style
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string());
            registry = registry.with_extra_style(
                extensions,
                CommentStyle::custom(style.start.clone(), style.middle.clone(), style.end.clone()),
            );
        }

        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speclink_core::{Scanner, SourceFile};

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.marker(), "spec");
        assert_eq!(config.exclude(), ["target/**", "node_modules/**"]);
        let registry = config.registry().unwrap();
        assert!(!registry.scans(Some("txt")));
        assert!(registry.scans(Some("rs")));
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r##"
marker: req
specs:
  - docs/**/*.md
exclude: []
scan_unknown: true
styles:
  - extensions: [".tpl"]
    start: "{#"
    end: "#}"
"##;
        let config: Config = facet_yaml::from_str(yaml).unwrap();
        assert_eq!(config.marker(), "req");
        assert_eq!(config.specs, ["docs/**/*.md"]);
        assert!(config.include.is_empty());
        assert!(config.exclude().is_empty());

        let registry = config.registry().unwrap();
        assert!(registry.scans(Some("txt")));
        assert!(registry.knows("tpl"));

        let scanner = Scanner::with_registry(config.marker(), registry);
        let tags = scanner.scan(&SourceFile::new("page.tpl", "<p>{# req(ui.page): hi #}</p>"));
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].id, "ui.page");
        assert_eq!(tags[0].body, "hi");
    }

    #[test]
    fn test_empty_start_is_rejected() {
        let config = Config {
            styles: vec![StyleConfig {
                extensions: vec!["x".into()],
                start: String::new(),
                middle: None,
                end: None,
            }],
            ..Config::default()
        };
        assert!(config.registry().is_err());
    }
}
