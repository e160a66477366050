//! Multi-unit sessions
//!
//! A [`Session`] owns one [`Allocator`] for its whole lifetime, so routines
//! committed by one translation unit are visible to every later unit. Units
//! are processed in the order chosen by the [`discovery`] pass.

pub mod discovery;

use tracing::{debug, info};

use crate::ast::{Directive, Span, Spanned};
use crate::config::AllocConfig;
use crate::engine::{AllocError, Allocator, Warning};
use crate::lexer::{LexError, lex};
use crate::parser::{ParseError, Parser};

/// One source file and its directive stream
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    pub name: String,
    pub source: String,
    pub directives: Vec<Spanned<Directive>>,
}

impl TranslationUnit {
    pub fn parse(name: impl Into<String>, source: impl Into<String>) -> Result<Self, SessionError> {
        let name = name.into();
        let source = source.into();

        let tokens = lex(&source).map_err(|error| SessionError::Lex {
            unit: name.clone(),
            error,
        })?;
        let directives = Parser::parse(&tokens).map_err(|error| SessionError::Parse {
            unit: name.clone(),
            error,
        })?;

        Ok(Self {
            name,
            source,
            directives,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{unit}: {error}")]
    Lex { unit: String, error: LexError },

    #[error("{unit}: {error}")]
    Parse { unit: String, error: ParseError },

    #[error("{unit}: {error}")]
    Alloc { unit: String, error: AllocError },

    #[error("translation units depend on each other in a cycle: {}", .units.join(", "))]
    UnitCycle { units: Vec<String> },
}

impl SessionError {
    pub fn unit(&self) -> Option<&str> {
        match self {
            SessionError::Lex { unit, .. } | SessionError::Parse { unit, .. } | SessionError::Alloc { unit, .. } => {
                Some(unit.as_str())
            }
            SessionError::UnitCycle { .. } => None,
        }
    }

    /// Render with a source excerpt of the failing unit
    pub fn format_with_source(&self, source: &str) -> String {
        match self {
            SessionError::Lex { unit, error } => error.format_with_source_and_file(source, Some(unit.as_str())),
            SessionError::Parse { unit, error } => error.format_with_source_and_file(source, Some(unit.as_str())),
            SessionError::Alloc { unit, error } => error.format_with_source_and_file(source, Some(unit.as_str())),
            SessionError::UnitCycle { .. } => format!("error: {}", self),
        }
    }

    /// Like [`SessionError::format_with_source`], looking the unit up by name
    pub fn format_with_units(&self, units: &[TranslationUnit]) -> String {
        match self.unit().and_then(|name| units.iter().find(|u| u.name == name)) {
            Some(unit) => self.format_with_source(&unit.source),
            None => format!("error: {}", self),
        }
    }
}

/// A warning together with the unit that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitWarning {
    pub unit: String,
    pub warning: Warning,
}

impl UnitWarning {
    pub fn format_with_units(&self, units: &[TranslationUnit]) -> String {
        match units.iter().find(|u| u.name == self.unit) {
            Some(unit) => self.warning.format_with_source_and_file(&unit.source, Some(unit.name.as_str())),
            None => format!("warning: {}: {}", self.unit, self.warning),
        }
    }
}

pub struct Session {
    allocator: Allocator,
    warnings: Vec<UnitWarning>,
}

impl Session {
    pub fn new(config: AllocConfig) -> Self {
        Self {
            allocator: Allocator::new(config),
            warnings: Vec::new(),
        }
    }

    /// Allocate every unit. Stops at the first fatal error.
    pub fn run(&mut self, units: &[TranslationUnit]) -> Result<(), SessionError> {
        let plan = discovery::plan(units)?;

        if self.allocator.config().checks.implicit_declarations {
            for name in &plan.undeclared {
                // Already-declared names come from an earlier run of this session
                if !self.allocator.registry().is_declared(name) {
                    self.allocator
                        .declare_routine(name, Span::dummy())
                        .map_err(|error| SessionError::Alloc {
                            unit: String::from("<discovery>"),
                            error,
                        })?;
                }
            }
        }

        for &index in &plan.order {
            let unit = &units[index];
            debug!(unit = %unit.name, directives = unit.directives.len(), "allocating unit");
            let result = self.allocator.run(&unit.directives);

            // Keep warnings from a failing unit too
            let warnings = self.allocator.take_warnings();
            self.warnings.extend(warnings.into_iter().map(|warning| UnitWarning {
                unit: unit.name.clone(),
                warning,
            }));

            result.map_err(|error| SessionError::Alloc {
                unit: unit.name.clone(),
                error,
            })?;
        }

        info!(
            units = units.len(),
            routines = self.allocator.layouts().len(),
            warnings = self.warnings.len(),
            "session complete"
        );
        Ok(())
    }

    /// Warnings from every unit processed so far, in processing order
    pub fn warnings(&self) -> &[UnitWarning] {
        &self.warnings
    }

    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    pub fn allocator_mut(&mut self) -> &mut Allocator {
        &mut self.allocator
    }

    pub fn into_allocator(self) -> Allocator {
        self.allocator
    }
}
