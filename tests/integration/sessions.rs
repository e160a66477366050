//! Multi-unit sessions
//!
//! The registry outlives each translation unit; units are ordered so a
//! dependency is always closed before it is used

use crate::common::*;
use zpalloc::config::Strictness;
use zpalloc::engine::Unresolved;
use zpalloc::{AllocError, Session, SessionError};

const LEAF_UNIT: &str = r#"
.declare leaf
.routine leaf
    .local foo
    .local bar
.endroutine
"#;

const STEM_UNIT: &str = r#"
.declare stem
.routine stem
    .uses leaf
    .local foo
    jsr leaf
.endroutine
"#;

#[test]
fn registry_spans_units() {
    let (session, result) = run_session(test_config(), &[("leaf.zs", LEAF_UNIT), ("stem.zs", STEM_UNIT)]);
    result.unwrap();

    let allocator = session.allocator();
    assert_offset(allocator, "stem", "foo", 2);
    assert_size(allocator, "stem", 3);
}

#[test]
fn units_reordered_by_dependency() {
    let (session, result) = run_session(test_config(), &[("stem.zs", STEM_UNIT), ("leaf.zs", LEAF_UNIT)]);
    result.unwrap();

    let names: Vec<_> = session.allocator().layouts().iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["leaf", "stem"]);
    assert_size(session.allocator(), "stem", 3);
}

#[test]
fn missing_definition_still_unresolved() {
    let (_, result) = run_session(
        test_config(),
        &[("stem.zs", ".declare stem, leaf\n.routine stem\n.uses leaf\n.endroutine")],
    );
    match result {
        Err(SessionError::Alloc {
            unit,
            error: AllocError::UnresolvedDependency { reason, .. },
        }) => {
            assert_eq!(unit, "stem.zs");
            assert_eq!(reason, Unresolved::NotClosed);
        }
        other => panic!("expected unresolved dependency, got {:?}", other),
    }
}

#[test]
fn unit_cycle_is_fatal() {
    let (_, result) = run_session(
        test_config(),
        &[
            ("a.zs", ".declare a\n.routine a\n.uses b\n.endroutine"),
            ("b.zs", ".declare b\n.routine b\n.uses a\n.endroutine"),
        ],
    );
    assert!(matches!(result, Err(SessionError::UnitCycle { .. })));
}

#[test]
fn forward_declaration_required_by_default() {
    let (_, result) = run_session(test_config(), &[("a.zs", ".routine a\n.endroutine")]);
    assert!(matches!(
        result,
        Err(SessionError::Alloc {
            error: AllocError::UndeclaredRoutine { .. },
            ..
        })
    ));
}

#[test]
fn implicit_declarations_across_units() {
    let config = test_config().with_implicit_declarations(true);
    let (session, result) = run_session(
        config,
        &[
            ("stem.zs", ".routine stem\n.uses leaf\n.local x\n.endroutine"),
            ("leaf.zs", ".routine leaf\n.local y, 3\n.endroutine"),
        ],
    );
    result.unwrap();
    assert_offset(session.allocator(), "stem", "x", 3);
}

#[test]
fn implicit_declarations_still_reject_double_forward_declaration() {
    let config = test_config().with_implicit_declarations(true);
    let (_, result) = run_session(config, &[("a.zs", ".declare a\n.declare a")]);
    assert!(matches!(
        result,
        Err(SessionError::Alloc {
            error: AllocError::DoubleDeclaration { defined: false, .. },
            ..
        })
    ));
}

#[test]
fn warnings_are_attributed_to_units() {
    let (session, result) = run_session(
        config_with_strictness(Strictness::Calls),
        &[
            ("leaf.zs", LEAF_UNIT),
            ("main.zs", ".declare main\n.routine main\n    jsr leaf\n.endroutine\n"),
        ],
    );
    result.unwrap();

    let warnings = session.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].unit, "main.zs");

    let units = units(&[("main.zs", ".declare main\n.routine main\n    jsr leaf\n.endroutine\n")]);
    assert!(warnings[0].format_with_units(&units).contains("main.zs:3:5"));
}

#[test]
fn sessions_are_independent() {
    let units = units(&[("leaf.zs", LEAF_UNIT)]);

    let mut first = Session::new(test_config());
    first.run(&units).unwrap();

    // A fresh session has its own empty registry
    let mut second = Session::new(test_config());
    assert!(second.allocator().registry().is_empty());
    second.run(&units).unwrap();
}

#[test]
fn error_renders_against_failing_unit() {
    let sources = [("leaf.zs", LEAF_UNIT), ("bad.zs", ".declare bad\n.routine bad\n.local x, 0\n.endroutine")];
    let (_, result) = run_session(test_config(), &sources);
    let err = result.unwrap_err();

    let rendered = err.format_with_units(&units(&sources));
    assert!(rendered.starts_with("error: local 'x' in routine 'bad' must be at least one byte wide"));
    assert!(rendered.contains("bad.zs:3:1"));
}
