//! Cross-referencing tags against the spec index

use crate::scanner::Tag;
use crate::spec::{SpecIndex, is_valid_spec_id};
use facet::Facet;
use std::collections::{BTreeMap, BTreeSet};

/// How well the code covers the specs
#[derive(Debug, Clone, Facet)]
pub struct CoverageReport {
    /// Number of specs in the index
    pub total_specs: usize,

    /// Specs with at least one tag, sorted
    pub covered: Vec<String>,

    /// Specs nobody tags, sorted
    pub uncovered: Vec<String>,

    /// Tags with a well-formed id that no spec declares
    pub orphaned: Vec<Tag>,

    /// Tags whose id is not a valid spec id
    pub malformed: Vec<Tag>,

    /// Tags of each covered spec
    pub tags_by_spec: BTreeMap<String, Vec<Tag>>,
}

impl CoverageReport {
    pub fn compute<'a>(specs: &SpecIndex, tags: impl IntoIterator<Item = &'a Tag>) -> Self {
        let mut orphaned = Vec::new();
        let mut malformed = Vec::new();
        let mut tags_by_spec: BTreeMap<String, Vec<Tag>> = BTreeMap::new();

        for tag in tags {
            if !is_valid_spec_id(&tag.id) {
                malformed.push(tag.clone());
            } else if specs.contains(&tag.id) {
                tags_by_spec.entry(tag.id.clone()).or_default().push(tag.clone());
            } else {
                orphaned.push(tag.clone());
            }
        }

        let covered: BTreeSet<&str> = tags_by_spec.keys().map(String::as_str).collect();
        let uncovered = specs
            .ids()
            .filter(|id| !covered.contains(id))
            .map(str::to_string)
            .collect();

        CoverageReport {
            total_specs: specs.len(),
            covered: covered.into_iter().map(str::to_string).collect(),
            uncovered,
            orphaned,
            malformed,
            tags_by_spec,
        }
    }

    /// Coverage percentage (0.0 - 100.0)
    pub fn coverage_percent(&self) -> f64 {
        if self.total_specs == 0 {
            return 100.0;
        }
        (self.covered.len() as f64 / self.total_specs as f64) * 100.0
    }

    /// Whether every tag resolves and coverage reaches `threshold` percent
    pub fn is_passing(&self, threshold: f64) -> bool {
        self.orphaned.is_empty()
            && self.malformed.is_empty()
            && self.coverage_percent() >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::SourceFile;
    use crate::scanner::Scanner;
    use crate::spec::SpecDocument;

    fn index() -> SpecIndex {
        SpecIndex::from_documents([SpecDocument::parse(
            "spec.md",
            "# cache\n## evict\n## load\n## store\n",
        )])
    }

    fn tags(source: &str) -> Vec<Tag> {
        Scanner::new("spec").scan(&SourceFile::new("lib.rs", source))
    }

    #[test]
    fn test_classification() {
        let tags = tags(
            "// spec(cache.evict)\n// spec(cache.evict): again\n// spec(cache.gone)\n// spec(bad id)\n// spec(cache.load)",
        );
        let report = CoverageReport::compute(&index(), &tags);

        assert_eq!(report.total_specs, 3);
        assert_eq!(report.covered, ["cache.evict", "cache.load"]);
        assert_eq!(report.uncovered, ["cache.store"]);
        assert_eq!(report.orphaned.len(), 1);
        assert_eq!(report.orphaned[0].id, "cache.gone");
        assert_eq!(report.malformed.len(), 1);
        assert_eq!(report.malformed[0].id, "bad id");
        assert_eq!(report.tags_by_spec["cache.evict"].len(), 2);
        assert!(!report.is_passing(0.0));
    }

    #[test]
    fn test_percent_and_threshold() {
        let tags = tags("// spec(cache.evict)\n// spec(cache.load)");
        let report = CoverageReport::compute(&index(), &tags);

        let percent = report.coverage_percent();
        assert!((percent - 200.0 / 3.0).abs() < 1e-9);
        assert!(report.is_passing(50.0));
        assert!(!report.is_passing(100.0));
    }

    #[test]
    fn test_empty_index_is_fully_covered() {
        let report = CoverageReport::compute(&SpecIndex::new(), &[]);
        assert_eq!(report.coverage_percent(), 100.0);
        assert!(report.is_passing(100.0));
    }
}
