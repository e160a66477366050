//! Lexer for zpalloc directive source
//!
//! Uses logos for tokenization. Whitespace and newlines are insignificant:
//! every directive starts with its own keyword, so the parser can find
//! directive boundaries without line structure.

use logos::Logos;

/// Tokens of the directive language
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // === Directives ===
    #[token(".declare")]
    Declare,
    #[token(".routine")]
    Routine,
    #[token(".endroutine")]
    EndRoutine,
    #[token(".uses")]
    Uses,
    #[token(".local")]
    Local,
    #[token(".export")]
    Export,

    // === Call mnemonics ===
    #[token("jsr")]
    #[token("JSR")]
    #[token("call")]
    Call,

    // === Delimiters ===
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,

    // === Literals ===
    #[regex(r"\$[0-9a-fA-F]+", |lex| parse_radix(&lex.slice()[1..], 16))]
    #[regex(r"0x[0-9a-fA-F]+", |lex| parse_radix(&lex.slice()[2..], 16))]
    #[regex(r"%[01]+", |lex| parse_radix(&lex.slice()[1..], 2))]
    #[regex(r"0b[01]+", |lex| parse_radix(&lex.slice()[2..], 2))]
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),

    // === Identifier ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // === Comments (skipped) ===
    #[regex(r";[^\n]*?", logos::skip)]
    Comment,
}

fn parse_radix(digits: &str, radix: u32) -> Option<i64> {
    i64::from_str_radix(digits, radix).ok()
}

/// A token with its span in the source
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: std::ops::Range<usize>,
}

/// Lex directive source into tokens
pub fn lex(source: &str) -> Result<Vec<SpannedToken>, LexError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => {
                tokens.push(SpannedToken {
                    token,
                    span: lexer.span(),
                });
            }
            Err(()) => {
                return Err(LexError {
                    span: lexer.span(),
                    message: format!("unexpected input: {:?}", &source[lexer.span()]),
                });
            }
        }
    }

    Ok(tokens)
}

/// An error that occurred during lexing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} at {}..{}", span.start, span.end)]
pub struct LexError {
    pub span: std::ops::Range<usize>,
    pub message: String,
}

impl LexError {
    pub fn format_with_source_and_file(&self, source: &str, filename: Option<&str>) -> String {
        let span = crate::ast::Span::new(self.span.start, self.span.end);
        format!(
            "error: {}\n{}",
            self.message,
            span.format_error_context(source, filename, "not a token")
        )
    }
}
