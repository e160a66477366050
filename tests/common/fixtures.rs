//! Common test fixtures
//!
//! Directive programs reused across the suite

/// `leaf` uses two bytes; `stem` reserves them before its own locals
pub const LEAF_STEM: &str = r#"
.declare leaf, stem

.routine leaf
    .local foo
    .local bar
.endroutine

.routine stem
    .uses leaf
    .local foo
    .local bar
    jsr leaf
.endroutine
"#;

/// `stem` lets `foo` share bytes with `leaf` by declaring the dependency late
pub const REORDERED_STEM: &str = r#"
.declare leaf, stem

.routine leaf
    .local foo
    .local bar
.endroutine

.routine stem
    .local foo
    .uses leaf
    .local bar
    jsr leaf
.endroutine
"#;

/// `stem` calls `leaf` without listing it in `.uses`
pub const UNDECLARED_CALL: &str = r#"
.declare leaf, stem

.routine leaf
    .local foo
.endroutine

.routine stem
    .local foo
    jsr leaf
.endroutine
"#;

/// Three-level chain: root -> mid -> leaf
pub const CHAIN: &str = r#"
.declare leaf, mid, root

.routine leaf
    .local a, 3
.endroutine

.routine mid
    .uses leaf
    .local b, 2
    jsr leaf
.endroutine

.routine root
    .uses mid
    .local c
    jsr mid
.endroutine
"#;

/// Two leaves that are never live together, and a caller of both
pub const SIBLINGS: &str = r#"
.declare left, right, top

.routine left
    .local l, 4
.endroutine

.routine right
    .local r, 2
.endroutine

.routine top
    .uses left, right
    .local t
    jsr left
    jsr right
.endroutine
"#;
