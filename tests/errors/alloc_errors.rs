//! Allocation error tests
//!
//! Every fatal error kind, with the details its message must carry

use crate::common::*;
use zpalloc::engine::{AllocError, DiagnosticKind, Misuse, Severity, Unresolved};

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn double_forward_declaration() {
    assert_error_kind(".declare leaf\n.declare leaf", DiagnosticKind::DoubleDeclaration);
}

#[test]
fn double_declaration_in_one_list() {
    assert_error_contains(".declare leaf, leaf", "already declared");
}

#[test]
fn routine_defined_twice() {
    assert_error_contains(
        r#"
        .declare leaf
        .routine leaf
        .endroutine
        .routine leaf
        .endroutine
        "#,
        "already defined",
    );
}

#[test]
fn routine_not_forward_declared() {
    let err = allocate_error(".routine leaf\n.endroutine");
    assert!(matches!(err, AllocError::UndeclaredRoutine { ref name, .. } if name == "leaf"));
}

// ============================================================================
// Dependencies
// ============================================================================

#[test]
fn dependency_never_declared() {
    let err = allocate_error(
        r#"
        .declare stem
        .routine stem
            .uses ghost
        .endroutine
        "#,
    );
    match err {
        AllocError::UnresolvedDependency {
            routine,
            dependency,
            reason,
            ..
        } => {
            assert_eq!(routine, "stem");
            assert_eq!(dependency, "ghost");
            assert_eq!(reason, Unresolved::NeverDeclared);
        }
        other => panic!("expected unresolved dependency, got {:?}", other),
    }
}

#[test]
fn dependency_declared_but_not_closed() {
    let err = allocate_error(
        r#"
        .declare stem, leaf
        .routine stem
            .uses leaf
        .endroutine
        .routine leaf
        .endroutine
        "#,
    );
    assert!(matches!(
        err,
        AllocError::UnresolvedDependency {
            reason: Unresolved::NotClosed,
            ..
        }
    ));
}

#[test]
fn self_dependency_is_unresolved() {
    assert_error_kind(
        r#"
        .declare loop
        .routine loop
            .uses loop
        .endroutine
        "#,
        DiagnosticKind::UnresolvedDependency,
    );
}

#[test]
fn unresolved_dependency_suggests_declaration() {
    assert_error_contains(
        ".declare stem\n.routine stem\n.uses ghost\n.endroutine",
        "missing `.declare` or import",
    );
}

// ============================================================================
// Context Misuse
// ============================================================================

#[test]
fn local_outside_routine() {
    let err = allocate_error(".local foo");
    assert_eq!(
        err,
        AllocError::ContextMisuse {
            misuse: Misuse::OutsideRoutine { directive: ".local" },
            span: zpalloc::Span::new(0, 10),
        }
    );
}

#[test]
fn uses_outside_routine() {
    assert_error_contains(".uses leaf", "`.uses` outside of a routine");
}

#[test]
fn close_without_open() {
    assert_error_contains(".endroutine", "`.endroutine` outside of a routine");
}

#[test]
fn nested_routines() {
    assert_error_contains(
        r#"
        .declare outer, inner
        .routine outer
        .routine inner
        .endroutine
        .endroutine
        "#,
        "routines do not nest",
    );
}

#[test]
fn unclosed_routine() {
    assert_error_contains(".declare leaf\n.routine leaf\n.local foo", "'leaf' is never closed");
}

// ============================================================================
// Locals
// ============================================================================

#[test]
fn duplicate_local() {
    assert_error_kind(
        r#"
        .declare leaf
        .routine leaf
            .local foo
            .local foo, 2
        .endroutine
        "#,
        DiagnosticKind::DuplicateLocal,
    );
}

#[test]
fn same_local_name_in_different_routines() {
    let allocator = allocate_success(
        r#"
        .declare a, b
        .routine a
            .local tmp
        .endroutine
        .routine b
            .local tmp
        .endroutine
        "#,
    );
    assert_offset(&allocator, "a", "tmp", 0);
    assert_offset(&allocator, "b", "tmp", 0);
}

#[test]
fn zero_width_local() {
    assert_error_kind(
        ".declare leaf\n.routine leaf\n.local nothing, 0\n.endroutine",
        DiagnosticKind::ZeroWidthLocal,
    );
}

// ============================================================================
// Overflow
// ============================================================================

#[test]
fn overflow_names_routine_and_bytes() {
    let err = allocate_error(
        r#"
        .declare hog
        .routine hog
            .local a, 10
            .local b, 7
        .endroutine
        "#,
    );
    assert_eq!(
        err.routine(),
        Some("hog"),
        "overflow should be attributed to the routine"
    );
    match err {
        AllocError::ScratchOverflow { routine, required, capacity, .. } => {
            assert_eq!(routine, "hog");
            assert_eq!(required, 17);
            assert_eq!(capacity, 16);
        }
        other => panic!("expected overflow, got {:?}", other),
    }
}

#[test]
fn overflow_through_dependency() {
    let err = allocate_error(
        r#"
        .declare leaf, stem
        .routine leaf
            .local buf, 15
        .endroutine
        .routine stem
            .uses leaf
            .local a
            .local b
        .endroutine
        "#,
    );
    match err {
        AllocError::ScratchOverflow { routine, required, .. } => {
            assert_eq!(routine, "stem");
            assert_eq!(required, 17);
        }
        other => panic!("expected overflow, got {:?}", other),
    }
}

#[test]
fn overflow_carries_no_warnings() {
    let source = r#"
        .declare hog
        .routine hog
            .local a, 20
        .endroutine
        "#;
    match allocate(source) {
        AllocResult::AllocError(AllocError::ScratchOverflow { .. }, warnings) => assert!(warnings.is_empty()),
        _ => panic!("expected overflow"),
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn error_diagnostic_is_structured() {
    let err = allocate_error(".declare leaf\n.declare leaf");
    let diag = err.to_diagnostic();
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.kind, DiagnosticKind::DoubleDeclaration);
    assert_eq!(diag.routine.as_deref(), Some("leaf"));
    assert_eq!(diag.span, zpalloc::Span::new(23, 27));
}

#[test]
fn error_renders_with_source_line() {
    let source = ".declare leaf\n.routine leaf\n  .uses ghost\n.endroutine\n";
    let err = allocate_error(source);
    let rendered = err.format_with_source_and_file(source, Some("leaf.zs"));
    assert!(rendered.starts_with("error: unresolved dependency 'ghost' in routine 'leaf'"));
    assert!(rendered.contains("leaf.zs:3:9"));
    assert!(rendered.contains("^^^^^"));
}
