//! promolint CLI - PHP style checker
//!
//! Available rules:
//! - constructor_promotion: Promote constructor-assigned properties to
//!   promoted constructor parameters when every property of the class
//!   qualifies; flag constructors that promote only a subset

mod config;
mod output;
mod process;

use anyhow::Result;
use clap::Parser;
use colored::*;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;

use config::Config;
use output::{OutputFormat, Reporter, ViolationInfo};
use process::{process_file, write_file};
use promolint_rules::{PhpVersion, RuleRegistry};

#[derive(Parser)]
#[command(name = "promolint")]
#[command(version = "0.1.0")]
#[command(about = "A Rust-based PHP constructor promotion checker")]
#[command(author = "promolint contributors")]
struct Cli {
    /// Files or directories to process
    #[arg(required_unless_present = "list_rules")]
    paths: Vec<PathBuf>,

    /// Check for violations without applying fixes (default mode)
    #[arg(long, conflicts_with = "fix")]
    check: bool,

    /// Apply fixes to files
    #[arg(long, conflicts_with = "check")]
    fix: bool,

    /// Show verbose output
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Rules to run (can be specified multiple times). Overrides config file.
    #[arg(long, short = 'r', value_name = "RULE")]
    rule: Vec<String>,

    /// Output format: text, json, diff
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Target PHP version (e.g. "8.1"). Overrides config file.
    #[arg(long, value_name = "VERSION")]
    php_version: Option<String>,

    /// Path to config file (default: auto-detect .promolint.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long)]
    no_config: bool,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let registry = RuleRegistry::new();

    // Handle --list-rules
    if cli.list_rules {
        println!("{}", "Available rules:".bold());
        for (name, description) in registry.list_rules() {
            println!("  {} - {}", name.green(), description);
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Load config file
    let config = if cli.no_config {
        Config::default()
    } else if let Some(config_path) = &cli.config {
        let cfg = Config::load_path(config_path)?;
        if cli.verbose {
            println!("{}: {}", "Using config".bold(), config_path.display());
        }
        cfg
    } else {
        match Config::load()? {
            Some((cfg, path)) => {
                if cli.verbose {
                    println!("{}: {}", "Using config".bold(), path.display());
                }
                cfg
            }
            None => Config::default(),
        }
    };

    // Determine output format: --json, then --format, then config
    let output_format = if cli.json {
        OutputFormat::Json
    } else {
        let requested = cli.format.as_deref().or(config.output.format.as_deref());
        match requested {
            Some(name) => OutputFormat::from_str(name).ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid output format '{}'. Valid options: text, json, diff",
                    name
                )
            })?,
            None => OutputFormat::Text,
        }
    };

    // Determine target PHP version: --php-version, then config
    let target = match cli.php_version.as_deref().or(config.php.version.as_deref()) {
        Some(version) => Some(PhpVersion::parse(version).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid PHP version '{}'. Valid options: 7.4, 8.0, 8.1, 8.2, 8.3, 8.4",
                version
            )
        })?),
        None => None,
    };

    let all_rules = registry.all_names();

    // Validate rule names from CLI
    for rule in &cli.rule {
        if !all_rules.contains(&rule.as_str()) {
            eprintln!(
                "{}: Unknown rule '{}'. Use --list-rules to see available rules.",
                "Error".red(),
                rule
            );
            return Ok(ExitCode::from(1));
        }
    }

    let enabled_rules = config.effective_rules(&all_rules, &cli.rule);

    if enabled_rules.is_empty() {
        eprintln!("{}: No rules enabled", "Error".red());
        return Ok(ExitCode::from(1));
    }

    // Determine mode: fix or check (check is default)
    let fix_mode = cli.fix;
    let check_mode = !fix_mode;

    if cli.verbose && output_format == OutputFormat::Text {
        println!(
            "{}: {}",
            "Mode".bold(),
            if fix_mode { "fix" } else { "check" }
        );
        println!(
            "{}: {}",
            "Rules".bold(),
            enabled_rules.iter().cloned().collect::<Vec<_>>().join(", ")
        );
        println!();
    }

    // Collect all file paths first
    let mut file_paths: Vec<PathBuf> = Vec::new();
    let mut missing_paths: Vec<PathBuf> = Vec::new();

    for path in &cli.paths {
        if path.is_file() {
            file_paths.push(path.clone());
        } else if path.is_dir() {
            for entry in walkdir::WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "php"))
            {
                let file_path = entry.path();
                if !config.should_exclude(file_path) {
                    file_paths.push(file_path.to_path_buf());
                }
            }
        } else {
            missing_paths.push(path.clone());
        }
    }

    // Process files in parallel
    let results: Vec<FileOutcome> = file_paths
        .par_iter()
        .map(|path| process_file_to_outcome(path, &enabled_rules, target))
        .collect();

    // Sort results by path for deterministic output
    let mut sorted_results: Vec<_> = results.into_iter().zip(file_paths.iter()).collect();
    sorted_results.sort_by(|a, b| a.1.cmp(b.1));

    let mut reporter = Reporter::new(output_format, cli.verbose);

    // Report missing paths
    for path in &missing_paths {
        if output_format == OutputFormat::Text {
            eprintln!(
                "{}: Path does not exist: {}",
                "Warning".yellow(),
                path.display()
            );
        }
    }

    // Report file results
    for (outcome, path) in sorted_results {
        report_outcome(path, outcome, fix_mode, &mut reporter)?;
    }

    // Exit nonzero when anything failed or (in check mode) needs fixing
    let summary = reporter.summary();
    let exit_code = if summary.errors > 0 {
        ExitCode::from(1)
    } else if check_mode && summary.total_violations > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    };

    reporter.finish(check_mode);

    Ok(exit_code)
}

/// Result of processing a single file (for parallel processing)
enum FileOutcome {
    /// File is clean
    Clean,
    /// File has violations to report, and possibly staged fixes
    HasViolations {
        violations: Vec<ViolationInfo>,
        old_source: String,
        new_source: Option<String>,
        fixed: usize,
    },
    /// Error occurred
    Error(String),
}

/// Process a file and return an outcome (no I/O beyond the read,
/// suitable for parallel execution)
fn process_file_to_outcome(
    path: &PathBuf,
    enabled_rules: &HashSet<String>,
    target: Option<PhpVersion>,
) -> FileOutcome {
    match process_file(path, enabled_rules, target) {
        Ok(result) => {
            if result.violations.is_empty() {
                FileOutcome::Clean
            } else {
                FileOutcome::HasViolations {
                    violations: result.violations,
                    old_source: result.old_source,
                    new_source: result.new_source,
                    fixed: result.fixed,
                }
            }
        }
        Err(e) => FileOutcome::Error(format!("{:#}", e)),
    }
}

/// Report a file outcome and optionally apply fixes
fn report_outcome(
    path: &PathBuf,
    outcome: FileOutcome,
    fix_mode: bool,
    reporter: &mut Reporter,
) -> Result<()> {
    match outcome {
        FileOutcome::Clean => {
            reporter.report_skipped(path);
        }
        FileOutcome::HasViolations {
            violations,
            old_source,
            new_source,
            fixed,
        } => {
            if fix_mode {
                if let Some(new_source) = &new_source {
                    write_file(path, new_source)?;
                }
                reporter.report_fix(path, violations, fixed);
            } else {
                let new_source = new_source.as_deref().unwrap_or(&old_source);
                reporter.report_check(path, violations, &old_source, new_source);
            }
        }
        FileOutcome::Error(msg) => {
            reporter.report_error(path, &msg);
        }
    }
    Ok(())
}
