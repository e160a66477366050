//! Symbol export surface

use crate::common::fixtures::*;
use crate::common::*;
use zpalloc::engine::{DiagnosticKind, ExportedSymbol};

#[test]
fn every_closed_routine_publishes_its_size() {
    let allocator = allocate_success(LEAF_STEM);
    let exports = allocator.exports();

    assert_eq!(exports.get("__scratch_leaf").map(ExportedSymbol::value), Some(2));
    assert_eq!(exports.get("__scratch_stem").map(ExportedSymbol::value), Some(4));
}

#[test]
fn export_inside_routine() {
    let allocator = allocate_success(
        r#"
        .declare leaf
        .routine leaf
            .local foo
            .local bar
            .export leaf: bar
        .endroutine
        "#,
    );
    let symbol = allocator.exports().get("leaf__bar").expect("leaf__bar exported");
    assert_eq!(symbol.value(), 1);
    assert_eq!(symbol.scoped_name(), "leaf::bar");
}

#[test]
fn export_directly_after_close() {
    let allocator = allocate_success(
        r#"
        .declare leaf
        .routine leaf
            .local foo
            .local bar
        .endroutine
        .export leaf: foo, bar
        "#,
    );
    assert_eq!(allocator.exports().get("leaf__foo").map(ExportedSymbol::value), Some(0));
    assert_eq!(allocator.exports().get("leaf__bar").map(ExportedSymbol::value), Some(1));
}

#[test]
fn only_listed_locals_are_exported() {
    let allocator = allocate_success(
        r#"
        .declare leaf
        .routine leaf
            .local public
            .local private
        .endroutine
        .export leaf: public
        "#,
    );
    assert!(allocator.exports().get("leaf__public").is_some());
    assert!(allocator.exports().get("leaf__private").is_none());
}

#[test]
fn export_does_not_move_offsets() {
    let allocator = allocate_success(
        r#"
        .declare leaf
        .routine leaf
            .local a
            .export leaf: a
            .local b
        .endroutine
        "#,
    );
    assert_offset(&allocator, "leaf", "a", 0);
    assert_offset(&allocator, "leaf", "b", 1);
    assert_size(&allocator, "leaf", 2);
}

#[test]
fn export_after_other_directive_is_detached() {
    assert_error_kind(
        r#"
        .declare leaf, other
        .routine leaf
            .local foo
        .endroutine
        .declare late
        .export leaf: foo
        "#,
        DiagnosticKind::ContextMisuse,
    );
}

#[test]
fn export_of_other_routine_is_detached() {
    assert_error_contains(
        r#"
        .declare leaf, stem
        .routine leaf
            .local foo
        .endroutine
        .routine stem
            .export leaf: foo
        .endroutine
        "#,
        "directly after it closes",
    );
}

#[test]
fn export_unknown_local() {
    assert_error_kind(
        r#"
        .declare leaf
        .routine leaf
            .local foo
        .endroutine
        .export leaf: nope
        "#,
        DiagnosticKind::UnknownLocal,
    );
}

#[test]
fn render_asm_lists_symbols_in_order() {
    let allocator = allocate_success(
        r#"
        .declare leaf
        .routine leaf
            .local foo
        .endroutine
        .export leaf: foo
        "#,
    );
    assert_eq!(
        allocator.exports().render_asm(),
        "; scratch symbols\n__scratch_leaf = $01 ; leaf::__scratch\nleaf__foo = $00 ; leaf::foo\n"
    );
}

#[test]
fn clashing_mangled_names_are_rejected() {
    let err = allocate_error(
        r#"
        .declare a__b, a
        .routine a__b
            .local c
        .endroutine
        .export a__b: c
        .routine a
            .local b__c
        .endroutine
        .export a: b__c
        "#,
    );
    assert_eq!(err.kind(), DiagnosticKind::SymbolCollision);
    assert_eq!(err.routine(), Some("a"));
    let message = err.to_string();
    assert!(message.contains("'a__b__c'"), "{}", message);
    assert!(message.contains("a::b__c"), "{}", message);
    assert!(message.contains("a__b::c"), "{}", message);
}

#[test]
fn exports_of_failed_routine_are_dropped() {
    let source = r#"
        .declare leaf
        .routine leaf
            .local foo
            .export leaf: foo
            .local buf, 16
        .endroutine
        "#;
    let tokens = zpalloc::lex(source).unwrap();
    let directives = zpalloc::Parser::parse(&tokens).unwrap();
    let mut allocator = zpalloc::Allocator::new(test_config());

    let err = allocator.run(&directives).unwrap_err();
    assert_eq!(err.kind(), DiagnosticKind::ScratchOverflow);
    assert!(allocator.exports().is_empty(), "{:?}", allocator.exports().symbols());
    assert!(allocator.registry().lookup_size("leaf").is_err());
}
