//! Directive stream nodes

use super::span::Spanned;

/// One directive of the stream, in source order
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// `.declare a, b` - register routine names before they are defined
    ForwardDeclare(Vec<Spanned<String>>),

    /// `.routine name`
    OpenRoutine(Spanned<String>),

    /// `.endroutine`
    CloseRoutine,

    /// `.export routine: local, ...`
    Export {
        routine: Spanned<String>,
        locals: Vec<Spanned<String>>,
    },

    /// `.uses a, b` - routines this one may call
    DeclareDependencies(Vec<Spanned<String>>),

    /// `.local name[, width]`
    AllocateLocal {
        name: Spanned<String>,
        /// Width in bytes; `None` means a single byte
        width: Option<Spanned<u16>>,
    },

    /// `jsr target` / `call target`
    CallSite(Spanned<String>),
}

impl Directive {
    /// Directive keyword as written in source, used in diagnostics
    pub fn keyword(&self) -> &'static str {
        match self {
            Directive::ForwardDeclare(_) => ".declare",
            Directive::OpenRoutine(_) => ".routine",
            Directive::CloseRoutine => ".endroutine",
            Directive::Export { .. } => ".export",
            Directive::DeclareDependencies(_) => ".uses",
            Directive::AllocateLocal { .. } => ".local",
            Directive::CallSite(_) => "jsr",
        }
    }
}
