//! zpalloc - static scratch-memory allocator for register-starved targets
//!
//! Routines on the 6502 share a small zero page window for locals and
//! argument passing. This crate assigns every routine's locals an offset in
//! that window, letting routines that are never live at the same time
//! overlap, and checks call sites against the declared call dependencies.

pub mod ast;
pub mod config;
pub mod engine;
pub mod lexer;
pub mod parser;
pub mod report;
pub mod session;

// Re-export commonly used types
pub use ast::{Directive, Span, Spanned};
pub use config::{AllocConfig, ScratchRegion, Strictness};
pub use engine::{AllocError, Allocator, Diagnostic, Severity, Warning};
pub use lexer::lex;
pub use parser::Parser;
pub use session::{Session, SessionError, TranslationUnit, UnitWarning};
