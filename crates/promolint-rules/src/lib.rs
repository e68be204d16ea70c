//! promolint-rules: Style rule implementations
//!
//! Available rules:
//! - constructor_promotion: promote constructor properties when every
//!   declared property of the class qualifies; flag constructors that
//!   mix promoted parameters with members that cannot be promoted

pub mod constructor_promotion;
pub mod registry;

pub use constructor_promotion::{
    check_constructor_promotion, ConstructorPromotionRule, CODE_DISALLOWED_PROMOTION,
    CODE_REQUIRED_PROMOTION,
};
pub use registry::{Category, PhpVersion, Rule, RuleRegistry};
