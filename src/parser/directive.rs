//! Directive parsing

use super::{ParseError, ParseResult, Parser};
use crate::ast::{Directive, Spanned};
use crate::lexer::Token;

impl Parser<'_> {
    pub(super) fn parse_directives(&mut self) -> ParseResult<Vec<Spanned<Directive>>> {
        let mut directives = Vec::new();
        while self.peek().is_some() {
            directives.push(self.parse_directive()?);
        }
        Ok(directives)
    }

    fn parse_directive(&mut self) -> ParseResult<Spanned<Directive>> {
        let start = self.current_span();

        let directive = match self.peek() {
            Some(Token::Declare) => {
                self.advance();
                Directive::ForwardDeclare(self.parse_name_list("routine name")?)
            }
            Some(Token::Routine) => {
                self.advance();
                Directive::OpenRoutine(self.expect_ident("routine name")?)
            }
            Some(Token::EndRoutine) => {
                self.advance();
                Directive::CloseRoutine
            }
            Some(Token::Uses) => {
                self.advance();
                Directive::DeclareDependencies(self.parse_name_list("routine name")?)
            }
            Some(Token::Local) => {
                self.advance();
                let name = self.expect_ident("local name")?;
                let width = if self.check(&Token::Comma) {
                    self.advance();
                    Some(self.parse_width()?)
                } else {
                    None
                };
                Directive::AllocateLocal { name, width }
            }
            Some(Token::Export) => {
                self.advance();
                let routine = self.expect_ident("routine name")?;
                self.expect(&Token::Colon, "':'")?;
                let locals = self.parse_name_list("local name")?;
                Directive::Export { routine, locals }
            }
            Some(Token::Call) => {
                self.advance();
                Directive::CallSite(self.expect_ident("call target")?)
            }
            _ => return Err(self.error_here("directive")),
        };

        Ok(Spanned::new(directive, start.merge(self.previous_span())))
    }

    /// `name (',' name)*`
    fn parse_name_list(&mut self, what: &str) -> ParseResult<Vec<Spanned<String>>> {
        let mut names = vec![self.expect_ident(what)?];
        while self.check(&Token::Comma) {
            self.advance();
            names.push(self.expect_ident(what)?);
        }
        Ok(names)
    }

    fn parse_width(&mut self) -> ParseResult<Spanned<u16>> {
        let span = self.current_span();
        match self.peek() {
            Some(Token::Integer(n)) => {
                let n = *n;
                self.advance();
                u16::try_from(n)
                    .map(|width| Spanned::new(width, span))
                    .map_err(|_| ParseError::invalid_integer(span, format!("width {} does not fit in 16 bits", n)))
            }
            _ => Err(self.error_here("local width")),
        }
    }
}
