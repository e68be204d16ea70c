//! End-to-end runs through the registry: lex, check, fix, re-check.

use std::collections::HashSet;

use mago_database::file::FileId;
use promolint_core::{apply_changesets, lex, CollectingSink};
use promolint_rules::{PhpVersion, RuleRegistry, CODE_REQUIRED_PROMOTION};

fn enabled() -> HashSet<String> {
    ["constructor_promotion".to_string()].into_iter().collect()
}

fn check(source: &str, target: Option<PhpVersion>, fix: bool) -> (CollectingSink, String) {
    let registry = RuleRegistry::new();
    let stream = lex(FileId::zero(), source);
    let mut sink = CollectingSink::new(fix);
    let changesets = registry.check_all(&stream, source, &enabled(), target, &mut sink);
    let fixed = apply_changesets(source, &changesets).unwrap();
    (sink, fixed)
}

const PROMOTABLE: &str = r#"<?php
namespace App\Models;

class Account {
    private string $owner;
    private int $balance = 0;

    public function __construct(string $owner, int $balance) {
        $this->owner = $owner;
        $this->balance = $balance;
    }
}
"#;

#[test]
fn fixes_through_the_registry() {
    let (sink, fixed) = check(PROMOTABLE, Some(PhpVersion::Php81), true);
    assert_eq!(sink.violations.len(), 2);
    assert!(sink
        .violations
        .iter()
        .all(|v| v.code == CODE_REQUIRED_PROMOTION && v.fixable));

    assert!(fixed.contains("__construct(private string $owner, private int $balance = 0)"));
    assert!(!fixed.contains("$this->owner"));
}

#[test]
fn fix_converges_in_one_round() {
    let (_, fixed) = check(PROMOTABLE, Some(PhpVersion::Php81), true);
    let (sink, refixed) = check(&fixed, Some(PhpVersion::Php81), true);
    assert!(sink.violations.is_empty());
    assert_eq!(fixed, refixed);
}

#[test]
fn version_gate_makes_rule_a_noop() {
    let (sink, fixed) = check(PROMOTABLE, Some(PhpVersion::Php74), true);
    assert!(sink.violations.is_empty());
    assert_eq!(fixed, PROMOTABLE);
}

#[test]
fn check_mode_reports_without_touching_source() {
    let (sink, fixed) = check(PROMOTABLE, None, false);
    assert_eq!(sink.violations.len(), 2);
    assert_eq!(fixed, PROMOTABLE);
}
