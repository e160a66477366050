//! Dependency Resolver
//!
//! When a routine declares that it calls another, its own locals must start
//! above everything the callee can touch. The callee's committed size is
//! already the high-water mark of its own dependencies, so folding it into
//! the cursor with `max` reserves the whole call chain below it.

use tracing::debug;

use super::context::RoutineContext;
use super::diagnostic::{AllocError, Warning};
use super::registry::RoutineRegistry;
use crate::ast::Spanned;
use crate::config::Strictness;

/// Fold each dependency's committed size into the context's cursor, left to
/// right. Returns advisory warnings for dependencies declared after locals.
pub fn resolve_dependencies(
    ctx: &mut RoutineContext,
    registry: &RoutineRegistry,
    names: &[Spanned<String>],
    strictness: Strictness,
) -> Result<Vec<Warning>, AllocError> {
    let mut warnings = Vec::new();

    for name in names {
        let size = registry
            .lookup_size(&name.node)
            .map_err(|reason| AllocError::UnresolvedDependency {
                routine: ctx.owner().to_string(),
                dependency: name.node.clone(),
                reason,
                span: name.span,
            })?;

        if strictness >= Strictness::Pedantic && ctx.has_locals() {
            warnings.push(Warning::OutOfOrderDependencyDeclaration {
                routine: ctx.owner().to_string(),
                dependency: name.node.clone(),
                span: name.span,
            });
        }

        let before = ctx.cursor();
        ctx.reserve(size);
        ctx.record_dependency(&name.node);
        debug!(
            routine = ctx.owner(),
            dependency = %name.node,
            size,
            before,
            after = ctx.cursor(),
            "folded dependency"
        );
    }

    Ok(warnings)
}
