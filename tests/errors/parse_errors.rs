//! Front end error tests

use crate::common::*;

fn parse_error(source: &str) -> String {
    match allocate(source) {
        AllocResult::ParseError(e) => e,
        AllocResult::LexError(e) => panic!("Expected parse error, got lex error: {}", e),
        AllocResult::Success(_) => panic!("Expected parse error, but parsing succeeded"),
        AllocResult::AllocError(e, _) => panic!("Expected parse error, got allocation error: {}", e),
    }
}

#[test]
fn unknown_directive() {
    match allocate(".segment \"ZEROPAGE\"") {
        AllocResult::LexError(e) => assert!(e.contains("unexpected input")),
        _ => panic!("Expected lex error"),
    }
}

#[test]
fn routine_needs_name() {
    let e = parse_error(".routine\n.endroutine");
    assert!(e.contains("expected routine name"), "{}", e);
}

#[test]
fn export_needs_colon() {
    let e = parse_error(".export leaf foo");
    assert!(e.contains("expected ':'"), "{}", e);
}

#[test]
fn width_must_be_integer() {
    let e = parse_error(".local foo, bar");
    assert!(e.contains("expected local width"), "{}", e);
}

#[test]
fn bare_identifier_is_not_a_directive() {
    let e = parse_error("lda value");
    assert!(e.contains("expected directive"), "{}", e);
}

#[test]
fn eof_in_list() {
    let e = parse_error(".uses a,");
    assert!(e.contains("unexpected end of file"), "{}", e);
}
