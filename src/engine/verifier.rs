//! Call-Site Verifier
//!
//! Advisory check that a call target was listed in the caller's `.uses`.
//! Calls from top level and calls to names the registry does not track
//! (external or opaque routines) are exempt.

use super::context::RoutineContext;
use super::diagnostic::Warning;
use super::registry::RoutineRegistry;
use crate::ast::Span;
use crate::config::Strictness;

pub fn check_call(
    active: Option<&RoutineContext>,
    registry: &RoutineRegistry,
    target: &str,
    strictness: Strictness,
    span: Span,
) -> Option<Warning> {
    let caller = active?;
    if !registry.is_declared(target) {
        return None;
    }

    if strictness == Strictness::Silent || caller.depends_on(target) {
        return None;
    }

    Some(Warning::MissingDependencyDeclaration {
        caller: caller.owner().to_string(),
        target: target.to_string(),
        span,
    })
}
