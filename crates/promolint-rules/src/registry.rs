//! Rule trait and registry for promolint style rules

use promolint_core::{Changeset, DiagnosticSink, TokenStream};
use std::collections::HashSet;

/// Rule categories for grouping in `--list-rules` output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Rules that enforce a newer language idiom
    Modernization,
    /// Rules about layout and declaration style
    Style,
}

/// Minimum PHP version a rule's target syntax requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PhpVersion {
    Php74,
    Php80,
    Php81,
    Php82,
    Php83,
    Php84,
}

impl PhpVersion {
    /// Parse a version string like "8.0" or "8.1"
    pub fn parse(s: &str) -> Option<PhpVersion> {
        match s.trim() {
            "7.4" => Some(PhpVersion::Php74),
            "8.0" => Some(PhpVersion::Php80),
            "8.1" => Some(PhpVersion::Php81),
            "8.2" => Some(PhpVersion::Php82),
            "8.3" => Some(PhpVersion::Php83),
            "8.4" => Some(PhpVersion::Php84),
            _ => None,
        }
    }
}

/// A style rule that reports violations and can stage fixes
pub trait Rule: Send + Sync {
    /// The unique identifier for this rule (e.g. "constructor_promotion")
    fn name(&self) -> &'static str;

    /// A short description of what this rule checks
    fn description(&self) -> &'static str;

    fn category(&self) -> Category;

    /// The PHP version gate: below this version the rule never runs
    fn min_php_version(&self) -> Option<PhpVersion> {
        None
    }

    /// Check a token stream, reporting violations through the sink.
    /// Returns one changeset per fix the sink requested.
    fn check(
        &self,
        stream: &TokenStream,
        source: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> Vec<Changeset>;
}

/// Registry of all available style rules
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// Create a new registry with all built-in rules
    pub fn new() -> Self {
        let mut registry = Self { rules: Vec::new() };

        registry.register(Box::new(
            super::constructor_promotion::ConstructorPromotionRule,
        ));

        registry
    }

    /// Register a new rule
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Get all rule names
    pub fn all_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Get all rules with their descriptions (for --list-rules)
    pub fn list_rules(&self) -> Vec<(&'static str, &'static str)> {
        self.rules
            .iter()
            .map(|r| (r.name(), r.description()))
            .collect()
    }

    /// Rules that are both enabled by name and supported by the target
    /// PHP version. A rule whose version gate is not met is a no-op.
    pub fn get_applicable(
        &self,
        enabled: &HashSet<String>,
        target: Option<PhpVersion>,
    ) -> Vec<&dyn Rule> {
        self.rules
            .iter()
            .filter(|r| enabled.contains(r.name()))
            .filter(|r| match (r.min_php_version(), target) {
                (Some(min), Some(target)) => target >= min,
                _ => true,
            })
            .map(|r| r.as_ref())
            .collect()
    }

    /// Run all applicable rules on a token stream
    pub fn check_all(
        &self,
        stream: &TokenStream,
        source: &str,
        enabled: &HashSet<String>,
        target: Option<PhpVersion>,
        sink: &mut dyn DiagnosticSink,
    ) -> Vec<Changeset> {
        let mut changesets = Vec::new();
        for rule in self.get_applicable(enabled, target) {
            changesets.extend(rule.check(stream, source, sink));
        }
        changesets
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_enabled(registry: &RuleRegistry) -> HashSet<String> {
        registry.all_names().iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builtin_rules_are_registered() {
        let registry = RuleRegistry::new();
        assert!(registry.all_names().contains(&"constructor_promotion"));
    }

    #[test]
    fn version_gate_filters_rules() {
        let registry = RuleRegistry::new();
        let enabled = all_enabled(&registry);

        let on_php80 = registry.get_applicable(&enabled, Some(PhpVersion::Php80));
        assert!(on_php80.iter().any(|r| r.name() == "constructor_promotion"));

        let on_php74 = registry.get_applicable(&enabled, Some(PhpVersion::Php74));
        assert!(!on_php74.iter().any(|r| r.name() == "constructor_promotion"));

        // No configured version means no gate
        let ungated = registry.get_applicable(&enabled, None);
        assert!(ungated.iter().any(|r| r.name() == "constructor_promotion"));
    }

    #[test]
    fn php_version_ordering() {
        assert!(PhpVersion::Php81 > PhpVersion::Php80);
        assert_eq!(PhpVersion::parse("8.0"), Some(PhpVersion::Php80));
        assert_eq!(PhpVersion::parse("9.9"), None);
    }
}
