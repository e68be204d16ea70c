//! Span-based source code editing with atomic changesets

use mago_span::Span;
use thiserror::Error;

/// Errors that can occur during edit application
#[derive(Error, Debug)]
pub enum EditError {
    #[error("Overlapping edits detected at offset {0}")]
    OverlappingEdits(usize),

    #[error("Edit span {start}..{end} out of bounds for source length {len}")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },
}

/// Represents a single code edit operation
#[derive(Debug, Clone)]
pub struct Edit {
    /// The source span to replace (zero-width for insertions)
    pub span: Span,
    /// The replacement text
    pub replacement: String,
    /// Human-readable description of the edit
    pub message: String,
}

impl Edit {
    /// Create a new edit
    pub fn new(span: Span, replacement: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
            message: message.into(),
        }
    }

    /// Get the byte offset where this edit starts
    pub fn start_offset(&self) -> usize {
        self.span.start.offset as usize
    }

    /// Get the byte offset where this edit ends
    pub fn end_offset(&self) -> usize {
        self.span.end.offset as usize
    }
}

/// A group of edits that must be applied together or not at all.
///
/// A rule stages every edit for one finding into a changeset; the
/// driver commits changesets as whole units so an aborted run never
/// leaves a half-applied rewrite behind.
#[derive(Debug, Clone)]
pub struct Changeset {
    /// Name of the rule that produced this changeset
    pub rule: &'static str,
    /// Human-readable description of the whole change
    pub message: String,
    pub edits: Vec<Edit>,
}

impl Changeset {
    pub fn new(rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
            edits: Vec::new(),
        }
    }

    /// Stage an edit. Nothing is applied until the changeset is
    /// committed through [`apply_changesets`].
    pub fn add_edit(&mut self, span: Span, replacement: impl Into<String>) {
        self.edits
            .push(Edit::new(span, replacement, self.message.clone()));
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

/// Apply edits to source code, preserving surrounding formatting
///
/// Edits are applied in reverse order (from end to start) to maintain
/// valid offsets throughout the process. All edits are validated before
/// any text changes: on error the source is untouched.
pub fn apply_edits(source: &str, edits: &[Edit]) -> Result<String, EditError> {
    if edits.is_empty() {
        return Ok(source.to_string());
    }

    // Sort edits by start position (descending) for safe replacement
    let mut sorted_edits: Vec<&Edit> = edits.iter().collect();
    sorted_edits.sort_by(|a, b| b.start_offset().cmp(&a.start_offset()));

    // Validate: check for overlapping edits and bounds
    let source_len = source.len();
    let mut prev_start: Option<usize> = None;

    for edit in &sorted_edits {
        let start = edit.start_offset();
        let end = edit.end_offset();

        if end > source_len || start > end {
            return Err(EditError::SpanOutOfBounds {
                start,
                end,
                len: source_len,
            });
        }

        if let Some(prev) = prev_start {
            if end > prev {
                return Err(EditError::OverlappingEdits(start));
            }
        }

        prev_start = Some(start);
    }

    // Apply edits from end to start
    let mut result = source.to_string();

    for edit in sorted_edits {
        let start = edit.start_offset();
        let end = edit.end_offset();

        let replacement = if edit.replacement.is_empty() {
            edit.replacement.clone()
        } else {
            // Preserve leading whitespace from the replaced text
            adjust_whitespace(&source[start..end], &edit.replacement)
        };

        result.replace_range(start..end, &replacement);
    }

    Ok(result)
}

/// Commit changesets atomically: every edit of every changeset is
/// validated before any text is touched, so a rejected changeset means
/// no partial rewrite is ever visible.
pub fn apply_changesets(source: &str, changesets: &[Changeset]) -> Result<String, EditError> {
    let edits: Vec<Edit> = changesets
        .iter()
        .flat_map(|c| c.edits.iter().cloned())
        .collect();
    apply_edits(source, &edits)
}

/// Attempt to preserve whitespace patterns from original code
fn adjust_whitespace(original: &str, replacement: &str) -> String {
    let leading_ws: String = original
        .chars()
        .take_while(|c| c.is_whitespace())
        .collect();

    if !leading_ws.is_empty() && !replacement.starts_with(&leading_ws) {
        format!("{}{}", leading_ws, replacement.trim_start())
    } else {
        replacement.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mago_database::file::FileId;
    use mago_span::{Position, Span};

    fn make_span(start: u32, end: u32) -> Span {
        let file_id = FileId::zero();
        Span::new(file_id, Position::new(start), Position::new(end))
    }

    #[test]
    fn test_simple_replacement() {
        let source = "private $name;";
        let edit = Edit::new(make_span(0, 7), "protected", "visibility change");

        let result = apply_edits(source, &[edit]).unwrap();
        assert_eq!(result, "protected $name;");
    }

    #[test]
    fn test_insertion_at_point() {
        let source = "string $name";
        let edit = Edit::new(make_span(0, 0), "private ", "promote");

        let result = apply_edits(source, &[edit]).unwrap();
        assert_eq!(result, "private string $name");
    }

    #[test]
    fn test_full_line_removal_leaves_no_indentation() {
        let source = "a();\n    private $x;\nb();\n";
        let start = source.find("    private").unwrap() as u32;
        let end = source.find("b()").unwrap() as u32;
        let edit = Edit::new(make_span(start, end), "", "remove property");

        let result = apply_edits(source, &[edit]).unwrap();
        assert_eq!(result, "a();\nb();\n");
    }

    #[test]
    fn test_multiple_edits() {
        let source = "$a = 1; $b = 2;";
        let edits = vec![
            Edit::new(make_span(0, 7), "$x = 1;", "first"),
            Edit::new(make_span(8, 15), "$y = 2;", "second"),
        ];

        let result = apply_edits(source, &edits).unwrap();
        assert_eq!(result, "$x = 1; $y = 2;");
    }

    #[test]
    fn test_empty_edits() {
        let source = "unchanged";
        let result = apply_edits(source, &[]).unwrap();
        assert_eq!(result, "unchanged");
    }

    #[test]
    fn test_out_of_bounds() {
        let source = "short";
        let edit = Edit::new(make_span(0, 100), "replacement", "oob");

        let result = apply_edits(source, &[edit]);
        assert!(matches!(result, Err(EditError::SpanOutOfBounds { .. })));
    }

    #[test]
    fn test_overlapping_edits_rejected() {
        let source = "abcdefgh";
        let edits = vec![
            Edit::new(make_span(0, 5), "x", "one"),
            Edit::new(make_span(3, 7), "y", "two"),
        ];

        let result = apply_edits(source, &edits);
        assert!(matches!(result, Err(EditError::OverlappingEdits(_))));
    }

    #[test]
    fn test_changeset_commit_is_all_or_nothing() {
        let source = "abcdefgh";
        let mut good = Changeset::new("rule", "good");
        good.add_edit(make_span(0, 2), "X");
        let mut bad = Changeset::new("rule", "bad");
        bad.add_edit(make_span(4, 100), "Y");

        // One invalid changeset rejects the whole commit
        let result = apply_changesets(source, &[good.clone(), bad]);
        assert!(result.is_err());

        let result = apply_changesets(source, &[good]).unwrap();
        assert_eq!(result, "Xcdefgh");
    }
}
