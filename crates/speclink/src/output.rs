//! Output formatting for tags and coverage reports

use eyre::Result;
use facet::Facet;
use owo_colors::OwoColorize;
use speclink_core::{CoverageReport, Duplicate, Tag};

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    #[value(alias = "md")]
    Markdown,
}

/// Render scanned tags in the specified format
pub fn render_tags(tags: &[Tag], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_tags_text(tags)),
        OutputFormat::Json => facet_json::to_string_pretty(&tags.to_vec())
            .map_err(|e| eyre::eyre!("JSON serialization failed: {e:?}")),
        OutputFormat::Markdown => Ok(render_tags_markdown(tags)),
    }
}

fn render_tags_text(tags: &[Tag]) -> String {
    let mut output = String::new();
    for tag in tags {
        output.push_str(&format!("{} {}", tag.location.dimmed(), tag.id.green()));
        let mut lines = tag.body.lines();
        if let Some(first) = lines.next() {
            output.push_str(&format!(": {}", first));
        }
        output.push('\n');
        for line in lines {
            output.push_str(&format!("    {}\n", line));
        }
    }
    output
}

fn render_tags_markdown(tags: &[Tag]) -> String {
    let mut output = String::new();
    output.push_str("| Location | Id | Body |\n|---|---|---|\n");
    for tag in tags {
        output.push_str(&format!(
            "| `{}` | `{}` | {} |\n",
            tag.location,
            tag.id,
            tag.body.replace('\n', "<br>").replace('|', "\\|")
        ));
    }
    output
}

/// Render a coverage report in the specified format
pub fn render_report(
    report: &CoverageReport,
    duplicates: &[Duplicate],
    format: OutputFormat,
    verbose: bool,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report, duplicates, verbose)),
        OutputFormat::Json => render_json(report, duplicates),
        OutputFormat::Markdown => Ok(render_markdown(report, duplicates, verbose)),
    }
}

fn render_text(report: &CoverageReport, duplicates: &[Duplicate], verbose: bool) -> String {
    let mut output = String::new();

    let percent = report.coverage_percent();
    let percent_str = format!("{:.1}%", percent);
    let color_percent = if percent >= 80.0 {
        percent_str.green().to_string()
    } else if percent >= 50.0 {
        percent_str.yellow().to_string()
    } else {
        percent_str.red().to_string()
    };

    output.push_str(&format!(
        "Coverage: {} ({}/{} specs)\n\n",
        color_percent,
        report.covered.len(),
        report.total_specs
    ));

    if !duplicates.is_empty() {
        output.push_str(&format!(
            "{} Duplicate Specs ({}):\n",
            "!".red().bold(),
            duplicates.len()
        ));
        for d in duplicates {
            output.push_str(&format!(
                "  {} {} declared at {} and {}\n",
                "-".red(),
                d.id.yellow(),
                d.first,
                d.second
            ));
        }
        output.push('\n');
    }

    if !report.malformed.is_empty() {
        output.push_str(&format!(
            "{} Malformed Tags ({}):\n",
            "!".red().bold(),
            report.malformed.len()
        ));
        for tag in &report.malformed {
            output.push_str(&format!(
                "  {} {} - invalid id {}\n",
                "-".red(),
                tag.location,
                format!("({})", tag.id).yellow()
            ));
        }
        output.push('\n');
    }

    if !report.orphaned.is_empty() {
        output.push_str(&format!(
            "{} Orphaned Tags ({}):\n",
            "!".red().bold(),
            report.orphaned.len()
        ));
        for tag in &report.orphaned {
            output.push_str(&format!(
                "  {} {} - unknown spec {}\n",
                "-".red(),
                tag.location,
                tag.id.yellow()
            ));
        }
        output.push('\n');
    }

    if !report.uncovered.is_empty() {
        output.push_str(&format!(
            "{} Uncovered Specs ({}):\n",
            "?".yellow().bold(),
            report.uncovered.len()
        ));
        for id in &report.uncovered {
            output.push_str(&format!("  {} {}\n", "-".yellow(), id.dimmed()));
        }
        output.push('\n');
    }

    if verbose && !report.tags_by_spec.is_empty() {
        output.push_str(&format!("{} Covered Specs:\n", "+".green().bold()));
        for (id, tags) in &report.tags_by_spec {
            output.push_str(&format!("  {} ({} tags)\n", id.green(), tags.len()));
            for tag in tags {
                output.push_str(&format!("      {}\n", tag.location.dimmed()));
            }
        }
        output.push('\n');
    }

    output
}

#[derive(Facet)]
struct JsonReport {
    total_specs: usize,
    covered_specs: usize,
    coverage_percent: f64,
    uncovered: Vec<String>,
    orphaned: Vec<JsonTag>,
    malformed: Vec<JsonTag>,
    duplicates: Vec<Duplicate>,
    tags: Vec<JsonTag>,
}

#[derive(Facet)]
struct JsonTag {
    id: String,
    location: String,
    body: String,
}

impl From<&Tag> for JsonTag {
    fn from(tag: &Tag) -> Self {
        JsonTag {
            id: tag.id.clone(),
            location: tag.location.clone(),
            body: tag.body.clone(),
        }
    }
}

fn render_json(report: &CoverageReport, duplicates: &[Duplicate]) -> Result<String> {
    let json_report = JsonReport {
        total_specs: report.total_specs,
        covered_specs: report.covered.len(),
        coverage_percent: report.coverage_percent(),
        uncovered: report.uncovered.clone(),
        orphaned: report.orphaned.iter().map(JsonTag::from).collect(),
        malformed: report.malformed.iter().map(JsonTag::from).collect(),
        duplicates: duplicates.to_vec(),
        tags: report.tags_by_spec.values().flatten().map(JsonTag::from).collect(),
    };

    facet_json::to_string_pretty(&json_report)
        .map_err(|e| eyre::eyre!("JSON serialization failed: {e:?}"))
}

fn render_markdown(report: &CoverageReport, duplicates: &[Duplicate], verbose: bool) -> String {
    let mut output = String::new();

    output.push_str("# Spec Coverage Report\n\n");
    output.push_str(&format!(
        "**Coverage:** {:.1}% ({}/{} specs)\n\n",
        report.coverage_percent(),
        report.covered.len(),
        report.total_specs
    ));

    if !duplicates.is_empty() {
        output.push_str("## Duplicate Specs\n\n");
        for d in duplicates {
            output.push_str(&format!("- `{}` at `{}` and `{}`\n", d.id, d.first, d.second));
        }
        output.push('\n');
    }

    if !report.malformed.is_empty() {
        output.push_str("## Malformed Tags\n\n");
        for tag in &report.malformed {
            output.push_str(&format!("- `{}` - invalid id `{}`\n", tag.location, tag.id));
        }
        output.push('\n');
    }

    if !report.orphaned.is_empty() {
        output.push_str("## Orphaned Tags\n\n");
        for tag in &report.orphaned {
            output.push_str(&format!("- `{}` - unknown spec `{}`\n", tag.location, tag.id));
        }
        output.push('\n');
    }

    if !report.uncovered.is_empty() {
        output.push_str("## Uncovered Specs\n\n");
        for id in &report.uncovered {
            output.push_str(&format!("- `{}`\n", id));
        }
        output.push('\n');
    }

    if verbose && !report.tags_by_spec.is_empty() {
        output.push_str("## Covered Specs\n\n");
        for (id, tags) in &report.tags_by_spec {
            output.push_str(&format!("- `{}` ({} tags)\n", id, tags.len()));
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use speclink_core::{Scanner, SourceFile, SpecDocument, SpecIndex};

    fn report() -> CoverageReport {
        let specs = SpecIndex::from_documents([SpecDocument::parse(
            "spec.md",
            "# net\n## retry\n## timeout\n",
        )]);
        let tags = Scanner::new("spec").scan(&SourceFile::new(
            "net.go",
            "// spec(net.retry): three times\n// spec(net.gone)\n// spec(bad id)",
        ));
        CoverageReport::compute(&specs, &tags)
    }

    #[test]
    fn test_markdown_report() {
        let output = render_report(&report(), &[], OutputFormat::Markdown, true).unwrap();
        assert!(output.contains("**Coverage:** 50.0% (1/2 specs)"));
        assert!(output.contains("- `net.go:2:4` - unknown spec `net.gone`"));
        assert!(output.contains("- `net.go:3:4` - invalid id `bad id`"));
        assert!(output.contains("- `net.timeout`"));
        assert!(output.contains("- `net.retry` (1 tags)"));
    }

    #[test]
    fn test_text_report_sections() {
        let output = render_report(&report(), &[], OutputFormat::Text, false).unwrap();
        assert!(output.contains("Orphaned Tags (1)"));
        assert!(output.contains("Malformed Tags (1)"));
        assert!(output.contains("Uncovered Specs (1)"));
        assert!(!output.contains("Duplicate Specs"));
    }

    #[test]
    fn test_tags_markdown_escapes_body() {
        let tags = Scanner::new("spec").scan(&SourceFile::new("a.rs", "// spec(a): x | y\n// z"));
        let output = render_tags(&tags, OutputFormat::Markdown).unwrap();
        assert!(output.contains("| `a.rs:1:4` | `a` | x \\| y<br>z |"));
    }
}
