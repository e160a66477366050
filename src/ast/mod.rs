//! Directive stream representation
//!
//! The parser turns directive source into a flat, ordered list of
//! [`Directive`]s; the allocator folds over that list without lookahead.

mod directive;
mod span;

pub use directive::Directive;
pub use span::{LineCol, Span, Spanned};
