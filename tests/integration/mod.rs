//! Integration tests for the allocation engine
//!
//! Whole directive programs run through lexer, parser and allocator

mod exports;
mod sessions;
