//! File processing logic for promolint

use anyhow::{Context, Result};
use mago_database::file::FileId;
use std::collections::HashSet;
use std::path::Path;

use promolint_core::{apply_changesets, lex, CollectingSink};
use promolint_rules::{
    PhpVersion, RuleRegistry, CODE_DISALLOWED_PROMOTION, CODE_REQUIRED_PROMOTION,
};

use crate::output::ViolationInfo;

/// Result of processing a single file
pub struct ProcessResult {
    /// Violations found in the file
    pub violations: Vec<ViolationInfo>,
    /// Original source code
    pub old_source: String,
    /// New source code after staged fixes (only when fixes were staged)
    pub new_source: Option<String>,
    /// Number of fixes staged
    pub fixed: usize,
}

/// Process a single PHP file and return the violations found.
///
/// Fixes are always staged so check mode can show what would change;
/// the caller decides whether to write the fixed source back.
pub fn process_file(
    path: &Path,
    enabled_rules: &HashSet<String>,
    target: Option<PhpVersion>,
) -> Result<ProcessResult> {
    let source_code = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let file_id = FileId::new(path.to_string_lossy().as_bytes());
    let stream = lex(file_id, &source_code);

    let registry = RuleRegistry::new();
    let mut sink = CollectingSink::new(true);
    let changesets = registry.check_all(&stream, &source_code, enabled_rules, target, &mut sink);

    if sink.violations.is_empty() {
        return Ok(ProcessResult {
            violations: vec![],
            old_source: source_code,
            new_source: None,
            fixed: 0,
        });
    }

    let violations: Vec<ViolationInfo> = sink
        .violations
        .iter()
        .map(|violation| {
            let (line, column) =
                offset_to_line_column(&source_code, violation.span.start.offset as usize);
            ViolationInfo {
                rule: rule_for_code(&violation.code),
                code: violation.code.clone(),
                line,
                column,
                message: violation.message.clone(),
                fixable: violation.fixable,
            }
        })
        .collect();

    let fixed = changesets.len();
    let new_source = if changesets.is_empty() {
        None
    } else {
        Some(
            apply_changesets(&source_code, &changesets)
                .with_context(|| format!("Failed to apply fixes to {}", path.display()))?,
        )
    };

    Ok(ProcessResult {
        violations,
        old_source: source_code,
        new_source,
        fixed,
    })
}

/// Write the processed result to the file
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Convert byte offset to line and column numbers (1-based)
fn offset_to_line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;

    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    (line, column)
}

/// Map a violation code back to the rule that emitted it
fn rule_for_code(code: &str) -> String {
    match code {
        CODE_REQUIRED_PROMOTION | CODE_DISALLOWED_PROMOTION => "constructor_promotion".to_string(),
        _ => "unknown".to_string(),
    }
}
