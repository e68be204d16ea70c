//! Locating the single unconditional `$this->x = $x;` assignment
//!
//! The resolver walks the constructor body's token range looking for
//! the exact shape `$this` `->` `x` `=` `$x` `;` through effective
//! tokens. The first textual match decides: if it sits under a
//! conditional construct the answer is "no assignment" — a conditional
//! capture is never promotable, and scanning on would only find a
//! second assignment, which is just as disqualifying.
//!
//! The mutation scan checks simple adjacency only: `$x` followed by an
//! assignment operator or `++`, or preceded by `--`. A parameter passed
//! by reference into a mutating call before the assignment is a known
//! false negative.

use promolint_core::{TokenKind, TokenStream};

/// The unconditional assignment found for one parameter.
#[derive(Debug, Clone)]
pub struct AssignmentRecord {
    /// Index of the `$this` token opening the statement
    pub this_pointer: usize,
    /// Index of the terminating `;`
    pub semicolon: usize,
}

/// How the analyzer asks for assignment facts. Token-backed in
/// production; fakeable in tests.
pub trait AssignmentLookup {
    /// The single direct `$this-><name> = <parameter>;` statement in
    /// the constructor body, or `None` when there is none or the first
    /// match is conditional.
    fn unconditional_assignment(&self, parameter: &str) -> Option<AssignmentRecord>;

    /// Whether the parameter is written to anywhere between the body's
    /// start and the located assignment.
    fn modified_before(&self, parameter: &str, assignment: &AssignmentRecord) -> bool;
}

/// Token-backed resolver for one constructor body.
pub struct AssignmentResolver<'a> {
    stream: &'a TokenStream,
    function: usize,
    scope_opener: usize,
    scope_closer: usize,
}

impl<'a> AssignmentResolver<'a> {
    pub fn new(
        stream: &'a TokenStream,
        function: usize,
        scope_opener: usize,
        scope_closer: usize,
    ) -> Self {
        Self {
            stream,
            function,
            scope_opener,
            scope_closer,
        }
    }

    /// Match `-> name = $param ;` behind a `$this` at `this_pointer`.
    fn match_assignment(&self, this_pointer: usize, parameter: &str) -> Option<usize> {
        let bare_name = parameter.trim_start_matches('$');
        let stream = self.stream;

        let arrow = stream.find_next_effective(this_pointer + 1)?;
        if stream.kind(arrow) != Some(TokenKind::Arrow) {
            return None;
        }

        let name = stream.find_next_effective(arrow + 1)?;
        if stream.kind(name) != Some(TokenKind::Identifier) || stream.text(name)? != bare_name {
            return None;
        }

        let equal = stream.find_next_effective(name + 1)?;
        if stream.kind(equal) != Some(TokenKind::Equal) {
            return None;
        }

        let value = stream.find_next_effective(equal + 1)?;
        if stream.kind(value) != Some(TokenKind::Variable) || stream.text(value)? != parameter {
            return None;
        }

        let semicolon = stream.find_next_effective(value + 1)?;
        if stream.kind(semicolon) != Some(TokenKind::Semicolon) {
            return None;
        }

        Some(semicolon)
    }
}

impl AssignmentLookup for AssignmentResolver<'_> {
    fn unconditional_assignment(&self, parameter: &str) -> Option<AssignmentRecord> {
        let stream = self.stream;
        for i in self.scope_opener + 1..self.scope_closer {
            if stream.kind(i) != Some(TokenKind::Variable) || stream.text(i) != Some("$this") {
                continue;
            }
            let Some(semicolon) = self.match_assignment(i, parameter) else {
                continue;
            };

            // A match nested inside if/elseif/else/switch counts as no
            // assignment at all.
            if stream.is_conditional_within(semicolon, self.function) {
                return None;
            }

            return Some(AssignmentRecord {
                this_pointer: i,
                semicolon,
            });
        }
        None
    }

    fn modified_before(&self, parameter: &str, assignment: &AssignmentRecord) -> bool {
        let stream = self.stream;
        for i in (self.scope_opener + 1..assignment.this_pointer).rev() {
            if stream.kind(i) != Some(TokenKind::Variable) || stream.text(i) != Some(parameter) {
                continue;
            }

            if let Some(next) = stream.find_next_effective(i + 1) {
                if let Some(kind) = stream.kind(next) {
                    if kind.is_assignment() || kind == TokenKind::Increment {
                        return true;
                    }
                }
            }

            if let Some(prev) = stream.find_prev_effective(i.saturating_sub(1)) {
                if stream.kind(prev) == Some(TokenKind::Decrement) {
                    return true;
                }
            }
        }
        false
    }
}
