//! Integration tests that run the speclink binary

use std::path::Path;
use std::process::{Command, Output};

fn speclink_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_speclink"))
}

fn write(root: &Path, path: &str, content: &str) {
    let path = root.join(path);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// A project whose tags cover every spec
fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        ".config/speclink/config.yaml",
        "specs:\n  - docs/**/*.md\nexclude:\n  - target/**\n",
    );
    write(root, "docs/net.md", "# net\n\n## retry\nRetry three times.\n\n## timeout\nGive up after 5s.\n");
    write(
        root,
        "src/retry.rs",
        "// spec(net.retry): three attempts\n// then give up\nfn retry() {}\n",
    );
    write(root, "src/timeout.py", "TIMEOUT = 5  # spec(net.timeout)\n");
    write(root, "target/generated.rs", "// spec(net.generated)\n");
    dir
}

fn run(root: &Path, args: &[&str]) -> Output {
    speclink_bin()
        .current_dir(root)
        .arg("-q")
        .args(args)
        .output()
        .expect("Failed to run speclink")
}

#[test]
fn test_scan_lists_tags() {
    let dir = project();
    let output = run(dir.path(), &["scan", "--format", "markdown"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("| `src/retry.rs:1:4` | `net.retry` | three attempts<br>then give up |"),
        "{stdout}"
    );
    assert!(stdout.contains("| `src/timeout.py:1:16` | `net.timeout` |"), "{stdout}");
    assert!(!stdout.contains("net.generated"), "excluded files are not scanned");
}

#[test]
fn test_scan_json() {
    let dir = project();
    let output = run(dir.path(), &["scan", "-f", "json", "src/retry.rs"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim_start().starts_with('['), "{stdout}");
    assert!(stdout.contains("net.retry"));
    assert!(stdout.contains("three attempts\\nthen give up"), "{stdout}");
    assert!(!stdout.contains("net.timeout"));
}

#[test]
fn test_scan_with_other_marker() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.go", "// req(a.b): go\n// spec(c.d)\n");

    let output = run(dir.path(), &["scan", "--marker", "req", "--format", "md"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("`a.b`"));
    assert!(!stdout.contains("`c.d`"));
}

#[test]
fn test_check_passes_when_everything_is_covered() {
    let dir = project();
    let output = run(dir.path(), &["check", "--threshold", "100", "--format", "md"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stdout));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("**Coverage:** 100.0% (2/2 specs)"), "{stdout}");
}

#[test]
fn test_check_fails_on_orphaned_tag() {
    let dir = project();
    write(dir.path(), "src/extra.ts", "/** spec(net.unknown) */\n");

    let output = run(dir.path(), &["check", "--format", "md"]);
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("- `src/extra.ts:1:5` - unknown spec `net.unknown`"), "{stdout}");
}

#[test]
fn test_check_fails_below_threshold() {
    let dir = project();
    std::fs::remove_file(dir.path().join("src/timeout.py")).unwrap();

    let output = run(dir.path(), &["check", "--threshold", "60", "--format", "md"]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("- `net.timeout`"), "{stdout}");

    let output = run(dir.path(), &["check", "--threshold", "50"]);
    assert!(output.status.success());
}

#[test]
fn test_check_fails_on_duplicate_spec() {
    let dir = project();
    write(dir.path(), "docs/more.md", "# net\n## retry\n");

    let output = run(dir.path(), &["check", "--format", "json"]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("docs/more.md:2:1"), "{stdout}");
}

#[test]
fn test_check_without_specs_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/lib.rs", "// spec(a)\n");

    let output = run(dir.path(), &["check"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No spec documents configured"), "{stderr}");
}

#[test]
fn test_explicit_missing_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["--config", "nope.yaml", "scan"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Config file not found"), "{stderr}");
}

#[test]
fn test_styles_command() {
    let dir = project();
    write(
        dir.path(),
        ".config/speclink/config.yaml",
        "styles:\n  - extensions: [tpl]\n    start: \"{#\"\n    end: \"#}\"\n",
    );

    let output = run(dir.path(), &["styles", "rs", "tpl", "txt"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("rs") && lines[0].contains("/** * */") && lines[0].contains("//"));
    assert!(lines[1].starts_with("tpl") && lines[1].contains("{# #}"));
    assert!(lines[2].contains("not scanned"));
}
