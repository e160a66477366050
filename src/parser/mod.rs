//! Parser for zpalloc directive source
//!
//! A recursive descent parser that turns tokens into the ordered
//! directive stream consumed by the allocator.

mod directive;
mod error;

pub use error::{ParseError, ParseErrorKind, ParseResult};

use crate::ast::{Directive, Span, Spanned};
use crate::lexer::{SpannedToken, Token};

/// The directive parser
pub struct Parser<'a> {
    tokens: &'a [SpannedToken],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [SpannedToken]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse a complete translation unit into its directive stream
    pub fn parse(tokens: &'a [SpannedToken]) -> ParseResult<Vec<Spanned<Directive>>> {
        let mut parser = Parser::new(tokens);
        parser.parse_directives()
    }

    // === Token navigation ===

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn check(&self, expected: &Token) -> bool {
        self.peek() == Some(expected)
    }

    /// Expect a specific token or return an error
    fn expect(&mut self, expected: &Token, what: &str) -> ParseResult<()> {
        if self.check(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(what))
        }
    }

    /// Expect an identifier and return it
    fn expect_ident(&mut self, what: &str) -> ParseResult<Spanned<String>> {
        let span = self.current_span();
        match self.peek().cloned() {
            Some(Token::Ident(name)) => {
                self.advance();
                Ok(Spanned::new(name, span))
            }
            _ => Err(self.error_here(what)),
        }
    }

    /// Build an "expected X" error for the current position
    fn error_here(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(tok) => ParseError::unexpected_token(self.current_span(), expected, Some(tok.clone())),
            None => ParseError::unexpected_eof(self.current_span(), expected),
        }
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|t| Span::new(t.span.start, t.span.end))
            .unwrap_or_else(|| {
                // EOF span - use end of last token or 0
                self.tokens
                    .last()
                    .map(|t| Span::new(t.span.end, t.span.end))
                    .unwrap_or_default()
            })
    }

    fn previous_span(&self) -> Span {
        if self.pos > 0 {
            let t = &self.tokens[self.pos - 1];
            Span::new(t.span.start, t.span.end)
        } else {
            Span::default()
        }
    }
}
