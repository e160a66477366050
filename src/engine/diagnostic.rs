//! Allocation errors and advisory warnings
//!
//! Errors stop processing of the current translation unit. Warnings are
//! collected and reported but never block allocation. Both convert to a
//! structured [`Diagnostic`]; rendering with source excerpts is done by the
//! `format_with_source_and_file` methods.

use crate::ast::Span;
use crate::config::ByteCount;

/// Why a dependency could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolved {
    /// No `.declare` (or import) for the name was seen
    NeverDeclared,
    /// Declared, but `.endroutine` has not been processed yet
    NotClosed,
}

impl std::fmt::Display for Unresolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unresolved::NeverDeclared => write!(f, "was never declared"),
            Unresolved::NotClosed => write!(f, "has not been closed yet"),
        }
    }
}

/// Directive used outside the routine state it requires
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Misuse {
    #[error("`{directive}` outside of a routine")]
    OutsideRoutine { directive: &'static str },

    #[error("cannot open routine '{name}' while '{open}' is still open; routines do not nest")]
    NestedRoutine { name: String, open: String },

    #[error("`.export {routine}` must appear inside '{routine}' or directly after it closes")]
    DetachedExport { routine: String },

    #[error("routine '{routine}' is never closed")]
    UnclosedRoutine { routine: String },
}

/// Fatal allocation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
    #[error("routine '{name}' is already {}", declared_or_defined(.defined))]
    DoubleDeclaration { name: String, defined: bool, span: Span },

    #[error("routine '{name}' has not been declared; add it to a `.declare` before `.routine {name}`")]
    UndeclaredRoutine { name: String, span: Span },

    #[error(
        "unresolved dependency '{dependency}' in routine '{routine}': it {reason} (missing `.declare` or import?)"
    )]
    UnresolvedDependency {
        routine: String,
        dependency: String,
        reason: Unresolved,
        span: Span,
    },

    #[error("{misuse}")]
    ContextMisuse { misuse: Misuse, span: Span },

    #[error("routine '{routine}' needs {required} bytes of scratch space but the region holds {capacity}")]
    ScratchOverflow {
        routine: String,
        required: u32,
        capacity: ByteCount,
        span: Span,
    },

    #[error("local '{name}' is already defined in routine '{routine}'")]
    DuplicateLocal { routine: String, name: String, span: Span },

    #[error("routine '{routine}' has no local '{name}' to export")]
    UnknownLocal { routine: String, name: String, span: Span },

    #[error("local '{name}' in routine '{routine}' must be at least one byte wide")]
    ZeroWidthLocal { routine: String, name: String, span: Span },

    #[error("symbol '{symbol}' for '{scoped}' is already exported for '{existing}'")]
    SymbolCollision {
        routine: String,
        symbol: String,
        scoped: String,
        existing: String,
        span: Span,
    },
}

fn declared_or_defined(defined: &bool) -> &'static str {
    if *defined { "defined" } else { "declared" }
}

impl AllocError {
    pub fn misuse(misuse: Misuse, span: Span) -> Self {
        AllocError::ContextMisuse { misuse, span }
    }

    pub fn span(&self) -> Span {
        match self {
            AllocError::DoubleDeclaration { span, .. }
            | AllocError::UndeclaredRoutine { span, .. }
            | AllocError::UnresolvedDependency { span, .. }
            | AllocError::ContextMisuse { span, .. }
            | AllocError::ScratchOverflow { span, .. }
            | AllocError::DuplicateLocal { span, .. }
            | AllocError::UnknownLocal { span, .. }
            | AllocError::ZeroWidthLocal { span, .. }
            | AllocError::SymbolCollision { span, .. } => *span,
        }
    }

    /// Routine the error is attributed to, if any
    pub fn routine(&self) -> Option<&str> {
        match self {
            AllocError::DoubleDeclaration { name, .. } | AllocError::UndeclaredRoutine { name, .. } => Some(name.as_str()),
            AllocError::UnresolvedDependency { routine, .. }
            | AllocError::ScratchOverflow { routine, .. }
            | AllocError::DuplicateLocal { routine, .. }
            | AllocError::UnknownLocal { routine, .. }
            | AllocError::ZeroWidthLocal { routine, .. }
            | AllocError::SymbolCollision { routine, .. } => Some(routine.as_str()),
            AllocError::ContextMisuse { misuse, .. } => match misuse {
                Misuse::OutsideRoutine { .. } => None,
                Misuse::NestedRoutine { open, .. } => Some(open.as_str()),
                Misuse::DetachedExport { routine } | Misuse::UnclosedRoutine { routine } => Some(routine.as_str()),
            },
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        match self {
            AllocError::DoubleDeclaration { .. } => DiagnosticKind::DoubleDeclaration,
            AllocError::UndeclaredRoutine { .. } => DiagnosticKind::UndeclaredRoutine,
            AllocError::UnresolvedDependency { .. } => DiagnosticKind::UnresolvedDependency,
            AllocError::ContextMisuse { .. } => DiagnosticKind::ContextMisuse,
            AllocError::ScratchOverflow { .. } => DiagnosticKind::ScratchOverflow,
            AllocError::DuplicateLocal { .. } => DiagnosticKind::DuplicateLocal,
            AllocError::UnknownLocal { .. } => DiagnosticKind::UnknownLocal,
            AllocError::ZeroWidthLocal { .. } => DiagnosticKind::ZeroWidthLocal,
            AllocError::SymbolCollision { .. } => DiagnosticKind::SymbolCollision,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            severity: Severity::Error,
            routine: self.routine().map(str::to_string),
            kind: self.kind(),
            message: self.to_string(),
            span: self.span(),
        }
    }

    pub fn format_with_source_and_file(&self, source: &str, filename: Option<&str>) -> String {
        self.to_diagnostic().format_with_source_and_file(source, filename)
    }
}

/// Advisory diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Call to a tracked routine that the caller never listed in `.uses`
    MissingDependencyDeclaration { caller: String, target: String, span: Span },

    /// `.uses` after locals were allocated; those locals may overlap the
    /// dependency's scratch bytes
    OutOfOrderDependencyDeclaration { routine: String, dependency: String, span: Span },
}

impl Warning {
    pub fn span(&self) -> Span {
        match self {
            Warning::MissingDependencyDeclaration { span, .. }
            | Warning::OutOfOrderDependencyDeclaration { span, .. } => *span,
        }
    }

    pub fn routine(&self) -> &str {
        match self {
            Warning::MissingDependencyDeclaration { caller, .. } => caller,
            Warning::OutOfOrderDependencyDeclaration { routine, .. } => routine,
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Warning::MissingDependencyDeclaration { .. } => DiagnosticKind::MissingDependencyDeclaration,
            Warning::OutOfOrderDependencyDeclaration { .. } => DiagnosticKind::OutOfOrderDependencyDeclaration,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            severity: Severity::Warning,
            routine: Some(self.routine().to_string()),
            kind: self.kind(),
            message: self.to_string(),
            span: self.span(),
        }
    }

    pub fn format_with_source_and_file(&self, source: &str, filename: Option<&str>) -> String {
        self.to_diagnostic().format_with_source_and_file(source, filename)
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::MissingDependencyDeclaration { caller, target, .. } => write!(
                f,
                "routine '{}' calls '{}' without declaring it in `.uses`",
                caller, target
            ),
            Warning::OutOfOrderDependencyDeclaration { routine, dependency, .. } => write!(
                f,
                "routine '{}' declares dependency '{}' after allocating locals; \
                 those locals may share bytes with '{}'",
                routine, dependency, dependency
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    DoubleDeclaration,
    UndeclaredRoutine,
    UnresolvedDependency,
    ContextMisuse,
    ScratchOverflow,
    DuplicateLocal,
    UnknownLocal,
    ZeroWidthLocal,
    SymbolCollision,
    MissingDependencyDeclaration,
    OutOfOrderDependencyDeclaration,
}

/// Structured, presentation-free diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub routine: Option<String>,
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn format_with_source_and_file(&self, source: &str, filename: Option<&str>) -> String {
        format!(
            "{}: {}\n{}",
            self.severity,
            self.message,
            self.span.format_error_context(source, filename, &self.message)
        )
    }
}
