//! Integration tests: scanning a small multi-language project
#![cfg(feature = "walk")]

use speclink_core::{
    CoverageReport, LineIndex, MemorySources, Scanner, SpecIndex, Tag, Tags, WalkSources,
    parse_location,
};
use std::path::{Path, PathBuf};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn project() -> PathBuf {
    Path::new(FIXTURES_DIR).join("project")
}

fn scan_project() -> Vec<Tag> {
    Tags::extract(WalkSources::new(project()), &Scanner::new("spec"))
        .expect("Failed to scan fixture project")
        .tags
        .tags
}

#[test]
fn test_fixture_project_tags() {
    let tags = scan_project();
    let found: Vec<(&str, &str)> = tags.iter().map(|t| (t.location.as_str(), t.id.as_str())).collect();

    assert_eq!(
        found,
        [
            ("src/cache.py:1:3", "cache.evict"),
            ("src/cache.py:4:8", "cache.load"),
            ("src/cache.rs:3:5", "cache.load"),
            ("src/cache.rs:9:22", "cache.evict"),
            ("src/cache.rs:11:4", "cache.unknown"),
            ("src/query.sql:1:4", "cache.load"),
            ("src/query.sql:2:27", "not valid!"),
        ]
    );
    assert_eq!(tags[0].body, "python side\nkeeps the same order");
    assert_eq!(tags[2].body, "a miss loads the entry\nand inserts it before returning");
    assert_eq!(tags[4].body, "nobody declared this");
    assert!(tags.iter().all(|t| t.name == "spec"));
}

#[test]
fn test_scans_are_deterministic() {
    let first = scan_project();
    for _ in 0..5 {
        assert_eq!(scan_project(), first);
    }
}

#[test]
fn test_tags_are_sorted_by_file_then_offset() {
    let tags = scan_project();
    for pair in tags.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!((&a.file, a.start_offset) < (&b.file, b.start_offset));
        if a.file == b.file {
            assert!(a.end_offset <= b.start_offset);
        }
    }
}

#[test]
fn test_locations_point_at_the_marker() {
    for tag in scan_project() {
        let (path, line, column) = parse_location(&tag.location).expect("location parses");
        assert_eq!(Path::new(path), tag.file);
        assert_eq!((line, column), (tag.line, tag.column));

        let content = std::fs::read_to_string(project().join(path)).unwrap();
        let line_start = LineIndex::new(&content).line_start(line).unwrap();
        let from_column: String = content[line_start..].chars().skip(column - 1).collect();
        assert!(from_column.starts_with("spec("), "{} does not point at a tag", tag.location);
        assert!(content[tag.start_offset..].starts_with("spec("));
    }
}

#[test]
fn test_coverage_against_fixture_spec() {
    let specs = SpecIndex::load(project(), &["docs/**/*.md".to_string()]).unwrap();
    assert_eq!(specs.ids().collect::<Vec<_>>(), ["cache.evict", "cache.load", "cache.stats"]);
    assert_eq!(
        specs.get("cache.load").unwrap().description,
        "A miss loads the entry from the object store and inserts it before returning."
    );

    let tags = scan_project();
    let report = CoverageReport::compute(&specs, &tags);
    assert_eq!(report.covered, ["cache.evict", "cache.load"]);
    assert_eq!(report.uncovered, ["cache.stats"]);
    assert_eq!(report.orphaned.len(), 1);
    assert_eq!(report.malformed.len(), 1);
    assert_eq!(report.tags_by_spec["cache.load"].len(), 3);
    assert!(!report.is_passing(0.0));
}

#[test]
fn test_memory_and_disk_agree() {
    let root = project();
    let mut memory = MemorySources::new();
    for name in ["src/cache.py", "src/cache.rs", "src/query.sql"] {
        memory = memory.add(name, std::fs::read_to_string(root.join(name)).unwrap());
    }
    let in_memory = Tags::extract(memory, &Scanner::new("spec")).unwrap().tags.tags;
    assert_eq!(in_memory, scan_project());
}
