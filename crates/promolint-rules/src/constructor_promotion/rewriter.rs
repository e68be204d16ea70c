//! The promotion rewrite
//!
//! One changeset per candidate: remove the property declaration (doc
//! block included), put the property's modifiers in front of the
//! parameter, migrate the property's default value when the parameter
//! has none, and remove the assignment statement. Removals span whole
//! lines so no stray indentation survives.

use mago_span::{Position, Span};
use promolint_core::{Changeset, TokenStream};

use super::analyzer::PromotionCandidate;
use super::RULE_NAME;

/// Build the atomic changeset that promotes one candidate.
pub fn build_changeset(
    stream: &TokenStream,
    source: &str,
    candidate: &PromotionCandidate,
) -> Option<Changeset> {
    let property = &candidate.property;
    let parameter = &candidate.parameter;

    let mut changeset = Changeset::new(
        RULE_NAME,
        format!("Promote property \"{}\"", property.name),
    );

    // Property declaration, from the doc block's line through the
    // terminator's line.
    let declaration_first = property.doc_opener.unwrap_or(property.declaration_start);
    let declaration_span = line_span(
        stream,
        source,
        declaration_first,
        property.end,
    )?;
    changeset.add_edit(declaration_span, "");

    // Modifiers in front of the parameter.
    let prefix = if property.is_readonly {
        format!("{} readonly ", property.visibility)
    } else {
        format!("{} ", property.visibility)
    };
    let start_token = stream.get(parameter.start)?;
    changeset.add_edit(insertion_point(start_token.span, start_token.start_offset()), prefix);

    // Default value migration.
    if !parameter.has_default {
        if let Some(default) = &property.default_value {
            let pointer_token = stream.get(parameter.pointer)?;
            changeset.add_edit(
                insertion_point(pointer_token.span, pointer_token.end_offset()),
                format!(" = {}", default),
            );
        }
    }

    // Assignment statement, whole lines.
    let assignment_span = line_span(
        stream,
        source,
        candidate.assignment.this_pointer,
        candidate.assignment.semicolon,
    )?;
    changeset.add_edit(assignment_span, "");

    Some(changeset)
}

/// Span from the start of `first`'s line through the end of `last`'s
/// line, newline included.
fn line_span(
    stream: &TokenStream,
    source: &str,
    first: usize,
    last: usize,
) -> Option<Span> {
    let first_token = stream.get(first)?;
    let last_token = stream.get(last)?;

    let start = source[..first_token.start_offset()]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    let end_offset = last_token.end_offset();
    let end = source[end_offset..]
        .find('\n')
        .map(|i| end_offset + i + 1)
        .unwrap_or(source.len());

    Some(Span::new(
        first_token.span.file_id,
        Position::new(start as u32),
        Position::new(end as u32),
    ))
}

/// Zero-width span at `offset`, for insertions.
fn insertion_point(reference: Span, offset: usize) -> Span {
    Span::new(
        reference.file_id,
        Position::new(offset as u32),
        Position::new(offset as u32),
    )
}
