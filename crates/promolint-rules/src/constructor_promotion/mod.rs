//! Rule: constructor property promotion must be all-or-nothing (PHP 8.0+)
//!
//! Example:
//! ```php
//! // Before
//! class User {
//!     private string $name;
//!     private int $age;
//!
//!     public function __construct(string $name, int $age) {
//!         $this->name = $name;
//!         $this->age = $age;
//!     }
//! }
//!
//! // After fixing RequiredPromotion
//! class User {
//!     public function __construct(private string $name, private int $age) {
//!     }
//! }
//! ```
//!
//! The decision per constructor is binary. Either every declared
//! property is provably just storage for its matching parameter — same
//! name, same type hint, no doc description, no attribute, a single
//! unconditional `$this->x = $x;` with the parameter untouched before
//! it — and all of them get a fixable `RequiredPromotion`, or nothing
//! is touched. `DisallowedPromotion` fires only when parameters already
//! carry promotion modifiers yet full promotion is impossible.

mod analyzer;
mod assignment;
mod descriptor;
mod rewriter;

pub use analyzer::{analyze, Decision, PromotionCandidate};
pub use assignment::{AssignmentLookup, AssignmentRecord, AssignmentResolver};
pub use descriptor::{
    extract, ConstructorDescriptor, ParameterDescriptor, ParameterKind, PropertyDescriptor,
};

use promolint_core::{Changeset, DiagnosticSink, TokenKind, TokenStream};

use crate::registry::{Category, PhpVersion, Rule};

pub(crate) const RULE_NAME: &str = "constructor_promotion";

pub const CODE_REQUIRED_PROMOTION: &str = "RequiredPromotion";
pub const CODE_DISALLOWED_PROMOTION: &str = "DisallowedPromotion";

/// Check every constructor in the stream, reporting through the sink.
/// Returns the changesets for fixes the sink requested.
pub fn check_constructor_promotion(
    stream: &TokenStream,
    source: &str,
    sink: &mut dyn DiagnosticSink,
) -> Vec<Changeset> {
    let mut changesets = Vec::new();

    for function in stream.find_all(TokenKind::Function, 0, stream.len()) {
        let Some(descriptor) = extract(stream, source, function) else {
            continue;
        };
        if descriptor.parameters.is_empty() {
            continue;
        }

        let resolver = AssignmentResolver::new(
            stream,
            descriptor.function,
            descriptor.scope_opener,
            descriptor.scope_closer,
        );

        match analyze(&descriptor, &resolver) {
            Decision::NoOp => {}
            Decision::Disallowed { parameter_names } => {
                let Some(anchor) = stream.get(function) else {
                    continue;
                };
                let names = parameter_names
                    .iter()
                    .map(|name| format!("\"{}\"", name))
                    .collect::<Vec<_>>()
                    .join(", ");
                sink.report_violation(
                    &format!(
                        "If all properties cannot be promoted, don't promote {} in constructor.",
                        names
                    ),
                    anchor.span,
                    CODE_DISALLOWED_PROMOTION,
                );
            }
            Decision::Fix(candidates) => {
                for candidate in &candidates {
                    let Some(anchor) = stream.get(candidate.property.pointer) else {
                        continue;
                    };
                    let fix = sink.report_fixable_violation(
                        &format!(
                            "Required promotion of property \"{}\".",
                            candidate.property.name
                        ),
                        anchor.span,
                        CODE_REQUIRED_PROMOTION,
                    );
                    if !fix {
                        continue;
                    }
                    if let Some(changeset) = rewriter::build_changeset(stream, source, candidate) {
                        changesets.push(changeset);
                    }
                }
            }
        }
    }

    changesets
}

pub struct ConstructorPromotionRule;

impl Rule for ConstructorPromotionRule {
    fn name(&self) -> &'static str {
        RULE_NAME
    }

    fn description(&self) -> &'static str {
        "Promote constructor properties when every property qualifies"
    }

    fn category(&self) -> Category {
        Category::Modernization
    }

    fn min_php_version(&self) -> Option<PhpVersion> {
        Some(PhpVersion::Php80)
    }

    fn check(
        &self,
        stream: &TokenStream,
        source: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> Vec<Changeset> {
        check_constructor_promotion(stream, source, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mago_database::file::FileId;
    use promolint_core::{apply_changesets, lex, CollectingSink, Violation};

    fn run(source: &str, fix: bool) -> (Vec<Violation>, Vec<Changeset>) {
        let stream = lex(FileId::zero(), source);
        let mut sink = CollectingSink::new(fix);
        let changesets = check_constructor_promotion(&stream, source, &mut sink);
        (sink.violations, changesets)
    }

    fn transform(source: &str) -> String {
        let (_, changesets) = run(source, true);
        apply_changesets(source, &changesets).unwrap()
    }

    // ==================== Basic Tests ====================

    #[test]
    fn test_rule_exists() {
        let rule = ConstructorPromotionRule;
        assert_eq!(rule.name(), "constructor_promotion");
        assert_eq!(rule.min_php_version(), Some(PhpVersion::Php80));
    }

    #[test]
    fn test_both_properties_promoted() {
        let source = r#"<?php
class User {
    private string $a;
    private int $b;

    public function __construct(string $a, int $b) {
        $this->a = $a;
        $this->b = $b;
    }
}
"#;
        let (violations, changesets) = run(source, true);
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.code == CODE_REQUIRED_PROMOTION));
        assert!(violations.iter().all(|v| v.fixable));
        assert_eq!(violations[0].message, "Required promotion of property \"$a\".");
        assert_eq!(changesets.len(), 2);

        let result = transform(source);
        assert!(result.contains("__construct(private string $a, private int $b)"));
        assert!(!result.contains("$this->a"));
        assert!(!result.contains("$a;"));
    }

    #[test]
    fn test_fix_not_requested_stages_nothing() {
        let source = r#"<?php
class User {
    private string $a;

    public function __construct(string $a) {
        $this->a = $a;
    }
}
"#;
        let (violations, changesets) = run(source, false);
        assert_eq!(violations.len(), 1);
        assert!(changesets.is_empty());
    }

    #[test]
    fn test_readonly_property_keeps_modifier() {
        let source = r#"<?php
class User {
    private readonly string $id;

    public function __construct(string $id) {
        $this->id = $id;
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("__construct(private readonly string $id)"));
    }

    #[test]
    fn test_protected_visibility_preserved() {
        let source = r#"<?php
class Base {
    protected string $name;

    public function __construct(string $name) {
        $this->name = $name;
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("__construct(protected string $name)"));
    }

    #[test]
    fn test_default_value_is_migrated() {
        let source = r#"<?php
class Retry {
    private int $attempts = 10;

    public function __construct(int $attempts) {
        $this->attempts = $attempts;
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("__construct(private int $attempts = 10)"));
        assert!(!result.contains("= 10;"));
    }

    #[test]
    fn test_parameter_default_wins_over_property_default() {
        let source = r#"<?php
class Retry {
    private int $attempts = 10;

    public function __construct(int $attempts = 5) {
        $this->attempts = $attempts;
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("__construct(private int $attempts = 5)"));
        assert!(!result.contains("= 10"));
    }

    #[test]
    fn test_doc_block_is_removed_with_property() {
        let source = r#"<?php
class User {
    /** @var string */
    private string $name;

    public function __construct(string $name) {
        $this->name = $name;
    }
}
"#;
        let result = transform(source);
        assert!(!result.contains("@var"));
        assert!(result.contains("__construct(private string $name)"));
    }

    // ==================== All-or-nothing ====================

    #[test]
    fn test_all_or_nothing_violation_count() {
        let source = r#"<?php
class Point {
    private float $x;
    private float $y;
    private float $z;

    public function __construct(float $x, float $y, float $z) {
        $this->x = $x;
        $this->y = $y;
        $this->z = $z;
    }
}
"#;
        let (violations, _) = run(source, false);
        // One RequiredPromotion per declared property, in the same pass
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn test_documented_property_blocks_all_promotion() {
        let source = r#"<?php
class User {
    /** The display name shown in the header. */
    private string $a;
    private int $b;

    public function __construct(string $a, int $b) {
        $this->a = $a;
        $this->b = $b;
    }
}
"#;
        let (violations, changesets) = run(source, true);
        assert!(violations.is_empty(), "partial coverage must stay silent");
        assert!(changesets.is_empty());
    }

    #[test]
    fn test_attribute_property_blocks_all_promotion() {
        let source = r#"<?php
class User {
    #[Deprecated]
    private string $a;

    public function __construct(string $a) {
        $this->a = $a;
    }
}
"#;
        let (violations, _) = run(source, false);
        assert!(violations.is_empty());
    }

    // ==================== DisallowedPromotion ====================

    #[test]
    fn test_promoted_next_to_variadic_is_disallowed() {
        let source = r#"<?php
class C {
    public function __construct(private string $a, string ...$b) {
    }
}
"#;
        let (violations, changesets) = run(source, true);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, CODE_DISALLOWED_PROMOTION);
        assert!(!violations[0].fixable);
        assert_eq!(
            violations[0].message,
            "If all properties cannot be promoted, don't promote \"$a\" in constructor."
        );
        assert!(changesets.is_empty());
    }

    #[test]
    fn test_promoted_next_to_by_reference_is_disallowed() {
        let source = r#"<?php
class C {
    public function __construct(private string $a, int &$b) {
    }
}
"#;
        let (violations, _) = run(source, false);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, CODE_DISALLOWED_PROMOTION);
    }

    #[test]
    fn test_count_mismatch_with_promotion_is_disallowed() {
        let source = r#"<?php
class C {
    private string $b;
    private int $c;

    public function __construct(private string $a) {
    }
}
"#;
        let (violations, _) = run(source, false);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, CODE_DISALLOWED_PROMOTION);
        assert!(violations[0].message.contains("\"$a\""));
    }

    #[test]
    fn test_unqualified_sibling_of_promoted_is_disallowed() {
        let source = r#"<?php
class C {
    private string $b;

    public function __construct(private int $a, string $b) {
        $this->b = strtolower($b);
    }
}
"#;
        // $b has no qualifying direct assignment, so promotion of $a
        // alone is incomplete
        let (violations, _) = run(source, false);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, CODE_DISALLOWED_PROMOTION);
    }

    #[test]
    fn test_disallowed_message_lists_every_promoted_parameter() {
        let source = r#"<?php
class C {
    public function __construct(private string $a, protected int $b, string ...$c) {
    }
}
"#;
        let (violations, _) = run(source, false);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("\"$a\", \"$b\""));
    }

    // ==================== Silent NoOp cases ====================

    #[test]
    fn test_count_mismatch_without_promotion_is_silent() {
        let source = r#"<?php
class C {
    private string $a;
    private int $extra;

    public function __construct(string $a) {
        $this->a = $a;
    }
}
"#;
        let (violations, _) = run(source, false);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_name_matching_is_exact() {
        let source = r#"<?php
class C {
    private int $count;

    public function __construct(int $countValue) {
        $this->count = $countValue;
    }
}
"#;
        let (violations, _) = run(source, false);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_conditional_assignment_is_silent() {
        let source = r#"<?php
class C {
    private string $a;

    public function __construct(string $a) {
        if ($a !== '') {
            $this->a = $a;
        }
    }
}
"#;
        let (violations, _) = run(source, false);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_mutated_parameter_is_silent() {
        let source = r#"<?php
class C {
    private string $a;

    public function __construct(string $a) {
        $a = trim($a);
        $this->a = $a;
    }
}
"#;
        let (violations, _) = run(source, false);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_type_mismatch_is_silent() {
        let source = r#"<?php
class C {
    private ?string $a;

    public function __construct(string $a) {
        $this->a = $a;
    }
}
"#;
        let (violations, _) = run(source, false);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_abstract_constructor_is_skipped() {
        let source = r#"<?php
abstract class C {
    abstract public function __construct(string $a);
}
"#;
        let (violations, _) = run(source, false);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_non_constructor_function_is_skipped() {
        let source = r#"<?php
class C {
    private string $a;

    public function setA(string $a) {
        $this->a = $a;
    }
}
"#;
        let (violations, _) = run(source, false);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_global_function_is_skipped() {
        let source = "<?php function __construct(string $a) { }";
        let (violations, _) = run(source, false);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_fully_promoted_constructor_is_silent() {
        let source = r#"<?php
class C {
    public function __construct(private string $a, private int $b) {
    }
}
"#;
        let (violations, _) = run(source, false);
        assert!(violations.is_empty());
    }

    // ==================== Idempotence ====================

    #[test]
    fn test_fix_is_a_fixed_point() {
        let source = r#"<?php
class User {
    private string $name;
    private readonly int $age;

    public function __construct(string $name, int $age) {
        $this->name = $name;
        $this->age = $age;
    }
}
"#;
        let fixed = transform(source);
        let (violations, changesets) = run(&fixed, true);
        assert!(violations.is_empty(), "fixed source must be clean: {}", fixed);
        assert!(changesets.is_empty());
    }

    #[test]
    fn test_two_classes_in_one_file() {
        let source = r#"<?php
class A {
    private string $x;

    public function __construct(string $x) {
        $this->x = $x;
    }
}

class B {
    private int $y;

    public function __construct(int $y) {
        $this->y = $y;
    }
}
"#;
        let (violations, _) = run(source, false);
        assert_eq!(violations.len(), 2);

        let result = transform(source);
        assert!(result.contains("__construct(private string $x)"));
        assert!(result.contains("__construct(private int $y)"));
    }
}
