//! speclink - Link spec documents to tags in source comments
//!
//! speclink scans source files of many languages for `spec(identifier): body`
//! tags in comments and cross-references them against identifiers declared
//! by markdown spec documents.

use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use owo_colors::OwoColorize;
use speclink::config::Config;
use speclink::output::{OutputFormat, render_report, render_tags};
use speclink::{CONFIG_PATH, find_project_root_from_cwd, load_config, load_config_or_default};
use speclink_core::{
    CoverageReport, PathSources, ScanResult, Scanner, SpecIndex, Tags, WalkSources,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Link spec documents to tags in source comments
#[derive(Parser, Debug)]
#[command(name = "speclink")]
#[command(version)]
#[command(about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to config file (default: .config/speclink/config.yaml in the project root)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project root (default: nearest ancestor with a config or .git)
    #[arg(short = 'C', long, global = true)]
    root: Option<PathBuf>,

    /// Don't print progress to stderr
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every tag found in source comments
    Scan {
        /// Files or directories to scan (default: the project root)
        paths: Vec<PathBuf>,

        /// Tag marker, overriding the config
        #[arg(short, long)]
        marker: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Check tags against the spec documents (exit 1 if failing)
    Check {
        /// Minimum coverage percentage to pass
        #[arg(short, long, default_value_t = 0.0)]
        threshold: f64,

        /// Show every tag of every covered spec
        #[arg(short, long)]
        verbose: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Show the comment styles used for each file extension
    Styles {
        /// Only show these extensions
        extensions: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SPECLINK_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let project_root = match &args.root {
        Some(root) => root.clone(),
        None => find_project_root_from_cwd()?,
    };
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_config_or_default(&project_root.join(CONFIG_PATH))?,
    };
    debug!(root = %project_root.display(), "loaded config");

    match args.command {
        Command::Scan {
            paths,
            marker,
            format,
        } => run_scan(&project_root, &config, paths, marker, format, args.quiet),
        Command::Check {
            threshold,
            verbose,
            format,
        } => {
            let passing =
                run_check(&project_root, &config, threshold, verbose, format, args.quiet)?;
            if !passing {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Styles { extensions } => run_styles(&config, &extensions),
    }
}

fn scanner(config: &Config, marker: Option<String>) -> Result<Scanner> {
    let marker = marker.unwrap_or_else(|| config.marker().to_string());
    if marker.is_empty() {
        eyre::bail!("Tag marker must not be empty");
    }
    Ok(Scanner::with_registry(marker, config.registry()?))
}

fn walk(root: &Path, config: &Config) -> WalkSources {
    WalkSources::new(root)
        .include(config.include.iter().cloned())
        .exclude(config.exclude())
}

fn report_warnings(result: &ScanResult, quiet: bool) {
    if quiet {
        return;
    }
    for warning in &result.warnings {
        eprintln!("{} {}", "!".yellow().bold(), warning);
    }
}

fn run_scan(
    project_root: &Path,
    config: &Config,
    paths: Vec<PathBuf>,
    marker: Option<String>,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let scanner = scanner(config, marker)?;

    let mut tags = Tags::new();
    if paths.is_empty() {
        let result = Tags::extract(walk(project_root, config), &scanner)?;
        report_warnings(&result, quiet);
        tags.extend(result.tags.tags);
    } else {
        let (dirs, files): (Vec<PathBuf>, Vec<PathBuf>) =
            paths.into_iter().partition(|path| path.is_dir());

        for dir in dirs {
            let result = Tags::extract(walk(&dir, config), &scanner)
                .wrap_err_with(|| format!("Failed to scan {}", dir.display()))?;
            report_warnings(&result, quiet);
            tags.extend(result.tags.tags);
        }
        tags.extend(Tags::extract(PathSources::new(files), &scanner)?.tags.tags);
    }
    tags.sort();

    if !quiet {
        eprintln!("{} Found {} tags", "->".blue().bold(), tags.len().to_string().green());
    }
    print!("{}", render_tags(&tags.tags, format)?);
    Ok(())
}

fn run_check(
    project_root: &Path,
    config: &Config,
    threshold: f64,
    verbose: bool,
    format: OutputFormat,
    quiet: bool,
) -> Result<bool> {
    if config.specs.is_empty() {
        eyre::bail!(
            "No spec documents configured - add `specs` globs to {}",
            CONFIG_PATH
        );
    }

    if !quiet {
        eprintln!(
            "{} Reading specs matching {}...",
            "->".blue().bold(),
            config.specs.join(", ").cyan()
        );
    }
    let specs = SpecIndex::load(project_root, &config.specs)?;
    info!(specs = specs.len(), duplicates = specs.duplicates.len(), "loaded spec index");
    if !quiet {
        eprintln!("   Found {} specs", specs.len().to_string().green());
        eprintln!("{} Scanning source files...", "->".blue().bold());
    }

    let result = Tags::extract(walk(project_root, config), &scanner(config, None)?)?;
    report_warnings(&result, quiet);
    if !quiet {
        eprintln!(
            "   Found {} tags in {} files",
            result.tags.len().to_string().green(),
            result.files_scanned
        );
    }

    let report = CoverageReport::compute(&specs, &result.tags);
    print!("{}", render_report(&report, &specs.duplicates, format, verbose)?);

    Ok(report.is_passing(threshold) && specs.duplicates.is_empty())
}

fn run_styles(config: &Config, extensions: &[String]) -> Result<()> {
    let registry = config.registry()?;
    let extensions: Vec<&str> = if extensions.is_empty() {
        registry.extensions()
    } else {
        extensions.iter().map(String::as_str).collect()
    };

    for ext in extensions {
        let styles: Vec<String> = registry
            .styles_for(ext)
            .iter()
            .map(|style| style.describe())
            .collect();
        if styles.is_empty() {
            println!("{:<8} {}", ext, "(not scanned)".dimmed());
        } else {
            println!("{:<8} {}", ext, styles.join("  "));
        }
    }
    Ok(())
}
