//! Output formatting for promolint
//!
//! Supports text (colored terminal), JSON and unified-diff output.

use colored::*;
use serde::Serialize;
use std::path::Path;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Diff,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "diff" => Some(OutputFormat::Diff),
            _ => None,
        }
    }
}

/// Information about a single violation
#[derive(Debug, Clone, Serialize)]
pub struct ViolationInfo {
    pub rule: String,
    pub code: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub fixable: bool,
}

/// Result of processing a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<ViolationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResult {
    pub fn success(path: &Path, violations: Vec<ViolationInfo>) -> Self {
        Self {
            path: path.display().to_string(),
            violations,
            error: None,
        }
    }

    pub fn error(path: &Path, error: String) -> Self {
        Self {
            path: path.display().to_string(),
            violations: Vec::new(),
            error: Some(error),
        }
    }

    #[allow(dead_code)]
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    #[allow(dead_code)]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Summary statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub files_processed: usize,
    pub files_with_violations: usize,
    pub total_violations: usize,
    pub fixed_violations: usize,
    pub errors: usize,
}

/// Full JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    pub version: String,
    pub summary: Summary,
    pub files: Vec<FileResult>,
}

/// Reporter for accumulating and outputting results
pub struct Reporter {
    format: OutputFormat,
    verbose: bool,
    results: Vec<FileResult>,
    summary: Summary,
}

impl Reporter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self {
            format,
            verbose,
            results: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Report a file in check mode, showing what would change
    pub fn report_check(
        &mut self,
        path: &Path,
        violations: Vec<ViolationInfo>,
        old_source: &str,
        new_source: &str,
    ) {
        self.summary.files_processed += 1;

        if violations.is_empty() {
            if self.verbose && self.format == OutputFormat::Text {
                println!("{}: No violations", path.display());
            }
            self.results.push(FileResult::success(path, vec![]));
            return;
        }

        self.summary.files_with_violations += 1;
        self.summary.total_violations += violations.len();

        match self.format {
            OutputFormat::Text => {
                println!("{}", path.display().to_string().bold());
                for violation in &violations {
                    let marker = if violation.fixable {
                        "[fixable]".green()
                    } else {
                        "[manual]".yellow()
                    };
                    println!(
                        "  {}:{} {} {}",
                        violation.line, violation.column, marker, violation.message
                    );
                }
                if old_source != new_source {
                    print_diff(old_source, new_source);
                }
                println!();
            }
            OutputFormat::Diff => {
                if old_source != new_source {
                    print_unified_diff(path, old_source, new_source);
                }
            }
            OutputFormat::Json => {
                // JSON output is handled in finish()
            }
        }

        self.results.push(FileResult::success(path, violations));
    }

    /// Report a file after applying fixes
    pub fn report_fix(&mut self, path: &Path, violations: Vec<ViolationInfo>, fixed: usize) {
        self.summary.files_processed += 1;

        if violations.is_empty() {
            if self.verbose && self.format == OutputFormat::Text {
                println!("{}: No violations", path.display());
            }
            self.results.push(FileResult::success(path, vec![]));
            return;
        }

        self.summary.files_with_violations += 1;
        self.summary.total_violations += violations.len();
        self.summary.fixed_violations += fixed;

        if self.format == OutputFormat::Text {
            println!("{}", path.display().to_string().bold());
            println!(
                "  {} Fixed {} of {} violation(s)",
                "OK".green(),
                fixed,
                violations.len()
            );
            for violation in violations.iter().filter(|v| !v.fixable) {
                println!(
                    "  {}:{} {} {}",
                    violation.line,
                    violation.column,
                    "[manual]".yellow(),
                    violation.message
                );
            }
            println!();
        }

        self.results.push(FileResult::success(path, violations));
    }

    /// Report a file that was skipped (no violations, not verbose)
    pub fn report_skipped(&mut self, path: &Path) {
        self.summary.files_processed += 1;
        if self.verbose && self.format == OutputFormat::Text {
            println!("{}: No violations", path.display());
        }
        self.results.push(FileResult::success(path, vec![]));
    }

    /// Report an error processing a file
    pub fn report_error(&mut self, path: &Path, error: &str) {
        self.summary.files_processed += 1;
        self.summary.errors += 1;

        if self.format == OutputFormat::Text {
            eprintln!("{}: {} - {}", "Warning".yellow(), path.display(), error);
        }

        self.results.push(FileResult::error(path, error.to_string()));
    }

    /// Print final summary/output
    pub fn finish(self, check_mode: bool) {
        match self.format {
            OutputFormat::Text => {
                println!();
                println!("{}", "Summary".bold().underline());
                println!("  Files processed: {}", self.summary.files_processed);
                println!(
                    "  Files with violations: {}",
                    self.summary.files_with_violations
                );
                println!("  Total violations: {}", self.summary.total_violations);
                if !check_mode {
                    println!("  Fixed: {}", self.summary.fixed_violations);
                }
                if self.summary.errors > 0 {
                    println!("  Errors: {}", self.summary.errors);
                }

                if check_mode && self.summary.total_violations > 0 {
                    println!();
                    println!("{}", "Run with --fix to apply fixes".yellow());
                }
            }
            OutputFormat::Json => {
                let output = JsonOutput {
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    summary: self.summary,
                    files: self.results,
                };
                match serde_json::to_string_pretty(&output) {
                    Ok(json) => println!("{}", json),
                    Err(e) => eprintln!("{}: {}", "Error".red(), e),
                }
            }
            OutputFormat::Diff => {
                // Diff format outputs each file's diff as it's processed
                // No summary needed for patch-compatible output
            }
        }
    }

    /// Get summary for exit code determination
    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

/// Print a colored line diff between old and new content
fn print_diff(old: &str, new: &str) {
    use similar::{ChangeTag, TextDiff};

    let diff = TextDiff::from_lines(old, new);
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Delete => {
                print!("  {}", format!("- {}", change).red());
            }
            ChangeTag::Insert => {
                print!("  {}", format!("+ {}", change).green());
            }
            ChangeTag::Equal => {
                // Skip unchanged lines for cleaner output
            }
        }
    }
}

/// Print unified diff format (standard diff -u compatible)
fn print_unified_diff(path: &Path, old: &str, new: &str) {
    use similar::{ChangeTag, TextDiff};

    let diff = TextDiff::from_lines(old, new);
    let path_str = path.display().to_string();

    println!("--- a/{}", path_str);
    println!("+++ b/{}", path_str);

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        println!("{}", hunk.header());
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            print!("{}{}", sign, change);
            if change.missing_newline() {
                println!();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("TEXT"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("diff"), Some(OutputFormat::Diff));
        assert_eq!(OutputFormat::from_str("xml"), None);
    }

    #[test]
    fn test_file_result_success() {
        let result = FileResult::success(Path::new("test.php"), vec![]);
        assert!(!result.has_violations());
        assert!(!result.has_error());
    }

    #[test]
    fn test_file_result_with_violations() {
        let violations = vec![ViolationInfo {
            rule: "constructor_promotion".to_string(),
            code: "RequiredPromotion".to_string(),
            line: 10,
            column: 5,
            message: "Required promotion of property \"$owner\".".to_string(),
            fixable: true,
        }];
        let result = FileResult::success(Path::new("test.php"), violations);
        assert!(result.has_violations());
        assert!(!result.has_error());
    }

    #[test]
    fn test_file_result_error() {
        let result = FileResult::error(Path::new("test.php"), "read error".to_string());
        assert!(!result.has_violations());
        assert!(result.has_error());
    }

    #[test]
    fn test_json_serialization() {
        let output = JsonOutput {
            version: "0.1.0".to_string(),
            summary: Summary {
                files_processed: 10,
                files_with_violations: 3,
                total_violations: 7,
                fixed_violations: 0,
                errors: 0,
            },
            files: vec![FileResult::success(
                Path::new("test.php"),
                vec![ViolationInfo {
                    rule: "constructor_promotion".to_string(),
                    code: "RequiredPromotion".to_string(),
                    line: 15,
                    column: 5,
                    message: "Required promotion of property \"$id\".".to_string(),
                    fixable: true,
                }],
            )],
        };

        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"version\":\"0.1.0\""));
        assert!(json.contains("\"files_processed\":10"));
        assert!(json.contains("\"code\":\"RequiredPromotion\""));
        assert!(json.contains("\"fixable\":true"));
    }
}
