//! Promotion eligibility analysis
//!
//! A pure decision function over extracted descriptors. It never
//! touches the token stream or the source text directly; assignment
//! facts come in through [`AssignmentLookup`] so the decision logic can
//! be tested against a fake resolver.
//!
//! The rule is deliberately conservative: a constructor that promotes
//! some fields and hand-declares others is worse than either pure
//! style, so any ineligible member pushes the whole constructor to
//! `NoOp` — and to `Disallowed` when promotion modifiers are already
//! present.

use super::assignment::{AssignmentLookup, AssignmentRecord};
use super::descriptor::{
    ConstructorDescriptor, ParameterDescriptor, ParameterKind, PropertyDescriptor,
};

/// A property/parameter pair proven eligible for promotion.
#[derive(Debug, Clone)]
pub struct PromotionCandidate {
    pub property: PropertyDescriptor,
    pub parameter: ParameterDescriptor,
    pub assignment: AssignmentRecord,
}

/// The analyzer's verdict for one constructor.
#[derive(Debug)]
pub enum Decision {
    /// Every declared property is promotable; promote them all
    Fix(Vec<PromotionCandidate>),
    /// Promotion modifiers are present but full promotion is invalid
    Disallowed {
        /// Names of the already-promoted parameters, with sigils
        parameter_names: Vec<String>,
    },
    /// Nothing to report
    NoOp,
}

/// Decide what to do with one constructor.
pub fn analyze(
    descriptor: &ConstructorDescriptor,
    assignments: &dyn AssignmentLookup,
) -> Decision {
    let parameters = &descriptor.parameters;
    if parameters.is_empty() {
        return Decision::NoOp;
    }

    let promoted: Vec<&ParameterDescriptor> = parameters
        .iter()
        .filter(|p| p.kind == ParameterKind::Promoted)
        .collect();
    let plain: Vec<&ParameterDescriptor> = parameters
        .iter()
        .filter(|p| p.kind == ParameterKind::Plain)
        .collect();
    let has_impossible = parameters
        .iter()
        .any(|p| p.kind == ParameterKind::Impossible);

    let disallowed = || Decision::Disallowed {
        parameter_names: promoted.iter().map(|p| p.name.clone()).collect(),
    };

    // Promotion modifiers next to a parameter that promotion cannot
    // express: never resolvable.
    if !promoted.is_empty() && has_impossible {
        return disallowed();
    }

    // Properties (declared plus already promoted) must correspond 1:1
    // to parameters. A mismatch without any promotion is just a
    // hand-written constructor.
    let property_count = promoted.len() + descriptor.properties.len();
    if property_count != parameters.len() {
        if !promoted.is_empty() {
            return disallowed();
        }
        return Decision::NoOp;
    }

    if descriptor.properties.is_empty() || plain.is_empty() {
        return Decision::NoOp;
    }

    let mut candidates: Vec<PromotionCandidate> = Vec::new();
    for parameter in &plain {
        for property in &descriptor.properties {
            if parameter.name != property.name {
                continue;
            }
            if property.has_useful_doc || property.has_attribute {
                continue;
            }
            if !type_hints_equal(&parameter.type_hint, &property.type_hint) {
                continue;
            }
            let Some(assignment) = assignments.unconditional_assignment(&parameter.name) else {
                continue;
            };
            if assignments.modified_before(&parameter.name, &assignment) {
                continue;
            }
            candidates.push(PromotionCandidate {
                property: property.clone(),
                parameter: (*parameter).clone(),
                assignment,
            });
        }
    }

    // With promotion already present, every remaining parameter must
    // have qualified.
    if !promoted.is_empty() && candidates.len() + promoted.len() != parameters.len() {
        return disallowed();
    }

    if candidates.is_empty() {
        return Decision::NoOp;
    }

    // Full coverage: promotion is forced only when every declared
    // property qualifies. Partial promotion is never suggested.
    if candidates.len() != descriptor.properties.len() {
        return Decision::NoOp;
    }

    Decision::Fix(candidates)
}

/// Both absent, or both present and textually identical. A nullability
/// difference is a difference.
fn type_hints_equal(parameter: &Option<String>, property: &Option<String>) -> bool {
    match (parameter, property) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
