//! Parse error types for the directive parser

use crate::ast::Span;
use crate::lexer::Token;

/// A parse error
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub span: Span,
    pub kind: ParseErrorKind,
}

/// The kind of parse error
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected token
    UnexpectedToken {
        expected: String,
        found: Option<Token>,
    },
    /// Unexpected end of input
    UnexpectedEof { expected: String },
    /// Integer literal out of range for its position
    InvalidInteger(String),
}

impl ParseError {
    pub fn unexpected_token(span: Span, expected: impl Into<String>, found: Option<Token>) -> Self {
        Self {
            span,
            kind: ParseErrorKind::UnexpectedToken {
                expected: expected.into(),
                found,
            },
        }
    }

    pub fn unexpected_eof(span: Span, expected: impl Into<String>) -> Self {
        Self {
            span,
            kind: ParseErrorKind::UnexpectedEof {
                expected: expected.into(),
            },
        }
    }

    pub fn invalid_integer(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            kind: ParseErrorKind::InvalidInteger(message.into()),
        }
    }

    fn message(&self) -> String {
        match &self.kind {
            ParseErrorKind::UnexpectedToken { expected, found } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of file".to_string(),
                };
                format!("expected {}, found {}", expected, found_str)
            }
            ParseErrorKind::UnexpectedEof { expected } => {
                format!("unexpected end of file, expected {}", expected)
            }
            ParseErrorKind::InvalidInteger(s) => format!("invalid integer: {}", s),
        }
    }

    /// Format error with source code context (line:col instead of byte offsets)
    pub fn format_with_source(&self, source: &str) -> String {
        format!("{} at {}", self.message(), self.span.format_position(source))
    }

    pub fn format_with_source_and_file(&self, source: &str, filename: Option<&str>) -> String {
        let msg = self.message();
        format!(
            "error: {}\n{}",
            msg,
            self.span.format_error_context(source, filename, &msg)
        )
    }
}

/// Format a token for display in error messages
fn format_token(token: &Token) -> String {
    match token {
        Token::Ident(name) => format!("identifier '{}'", name),
        Token::Integer(n) => format!("integer {}", n),
        Token::Comma => "','".to_string(),
        Token::Colon => "':'".to_string(),
        Token::Declare => "directive '.declare'".to_string(),
        Token::Routine => "directive '.routine'".to_string(),
        Token::EndRoutine => "directive '.endroutine'".to_string(),
        Token::Uses => "directive '.uses'".to_string(),
        Token::Local => "directive '.local'".to_string(),
        Token::Export => "directive '.export'".to_string(),
        Token::Call => "call mnemonic".to_string(),
        Token::Comment => "comment".to_string(),
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ParseErrorKind::UnexpectedEof { .. } => write!(f, "{}", self.message()),
            _ => write!(f, "{} at {}..{}", self.message(), self.span.start, self.span.end),
        }
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;
