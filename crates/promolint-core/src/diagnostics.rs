//! Diagnostic reporting
//!
//! Rules report findings through a [`DiagnosticSink`]; the sink decides
//! whether a fixable violation should actually be fixed. This keeps the
//! decision logic independent of the driver: the CLI answers with its
//! `--fix` flag, tests answer with whatever they want to exercise.

use mago_span::Span;

/// A recorded rule violation.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Stable violation code, e.g. `RequiredPromotion`
    pub code: String,
    pub message: String,
    /// Where the violation is anchored
    pub span: Span,
    /// Whether an automatic fix exists for this violation
    pub fixable: bool,
}

/// Receives violations from rules.
pub trait DiagnosticSink {
    /// Record a violation that cannot be fixed automatically.
    fn report_violation(&mut self, message: &str, span: Span, code: &str);

    /// Record a fixable violation. Returns whether the driver wants the
    /// fix applied; when `false` the rule must not stage any edit for
    /// this finding.
    fn report_fixable_violation(&mut self, message: &str, span: Span, code: &str) -> bool;
}

/// Sink that collects violations and answers every fix request with a
/// fixed policy. The CLI uses this with `fix = --fix`.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub fix: bool,
    pub violations: Vec<Violation>,
}

impl CollectingSink {
    pub fn new(fix: bool) -> Self {
        Self {
            fix,
            violations: Vec::new(),
        }
    }
}

impl DiagnosticSink for CollectingSink {
    fn report_violation(&mut self, message: &str, span: Span, code: &str) {
        self.violations.push(Violation {
            code: code.to_string(),
            message: message.to_string(),
            span,
            fixable: false,
        });
    }

    fn report_fixable_violation(&mut self, message: &str, span: Span, code: &str) -> bool {
        self.violations.push(Violation {
            code: code.to_string(),
            message: message.to_string(),
            span,
            fixable: true,
        });
        self.fix
    }
}
