//! Scratch allocation engine
//!
//! [`Allocator`] folds a directive stream into routine layouts:
//! - declarations populate the [`RoutineRegistry`]
//! - `.routine`/`.endroutine` bracket a [`RoutineContext`]
//! - `.uses` reserves the callee's footprint ([`resolver`])
//! - calls are checked against `.uses` ([`verifier`])
//!
//! All state is owned by the allocator, so independent sessions never
//! share a registry.

pub mod context;
pub mod diagnostic;
pub mod exports;
pub mod registry;
pub mod resolver;
pub mod verifier;

pub use context::{LocalVariable, RoutineContext, RoutineLayout};
pub use diagnostic::{AllocError, Diagnostic, DiagnosticKind, Misuse, Severity, Unresolved, Warning};
pub use exports::{ExportedSymbol, SymbolClash, SymbolExports};
pub use registry::{AlreadyDeclared, RoutineRecord, RoutineRegistry};

use tracing::{debug, trace, warn};

use crate::ast::{Directive, Span, Spanned};
use crate::config::{AllocConfig, ByteCount, Offset};

pub struct Allocator {
    config: AllocConfig,
    registry: RoutineRegistry,
    context: Option<RoutineContext>,
    /// Layout index of a routine that closed on the previous directive,
    /// which may still be exported
    just_closed: Option<usize>,
    layouts: Vec<RoutineLayout>,
    exports: SymbolExports,
    warnings: Vec<Warning>,
}

impl Allocator {
    pub fn new(config: AllocConfig) -> Self {
        Self {
            config,
            registry: RoutineRegistry::new(),
            context: None,
            just_closed: None,
            layouts: Vec::new(),
            exports: SymbolExports::new(),
            warnings: Vec::new(),
        }
    }

    /// Process one translation unit. A routine still open at the end is an
    /// error. On any error the open routine is discarded without committing.
    pub fn run(&mut self, directives: &[Spanned<Directive>]) -> Result<(), AllocError> {
        let result = directives
            .iter()
            .try_for_each(|directive| self.apply(directive))
            .and_then(|()| self.finish_unit());

        if result.is_err() {
            self.context = None;
            self.just_closed = None;
        }
        result
    }

    pub fn apply(&mut self, directive: &Spanned<Directive>) -> Result<(), AllocError> {
        trace!(directive = directive.node.keyword(), at = directive.span.start, "apply");
        if !matches!(directive.node, Directive::Export { .. }) {
            self.just_closed = None;
        }

        match &directive.node {
            Directive::ForwardDeclare(names) => {
                for name in names {
                    self.declare_routine(&name.node, name.span)?;
                }
                Ok(())
            }
            Directive::OpenRoutine(name) => self.open_routine(&name.node, name.span),
            Directive::CloseRoutine => self.close_routine(directive.span).map(|_| ()),
            Directive::Export { routine, locals } => self.export(routine, locals),
            Directive::DeclareDependencies(names) => self.declare_dependencies(names, directive.span),
            Directive::AllocateLocal { name, width } => {
                let width = width.as_ref().map_or(1, |w| w.node);
                self.allocate_local(&name.node, width, directive.span).map(|_| ())
            }
            Directive::CallSite(target) => {
                self.call_site(&target.node, directive.span);
                Ok(())
            }
        }
    }

    /// Forward declaration of a routine name
    pub fn declare_routine(&mut self, name: &str, span: Span) -> Result<(), AllocError> {
        self.registry
            .declare(name)
            .map_err(|AlreadyDeclared| AllocError::DoubleDeclaration {
                name: name.to_string(),
                defined: false,
                span,
            })?;
        trace!(routine = name, "declared");
        Ok(())
    }

    pub fn open_routine(&mut self, name: &str, span: Span) -> Result<(), AllocError> {
        if let Some(ctx) = &self.context {
            return Err(AllocError::misuse(
                Misuse::NestedRoutine {
                    name: name.to_string(),
                    open: ctx.owner().to_string(),
                },
                span,
            ));
        }

        if !self.registry.is_declared(name) {
            if !self.config.checks.implicit_declarations {
                return Err(AllocError::UndeclaredRoutine {
                    name: name.to_string(),
                    span,
                });
            }
            self.declare_routine(name, span)?;
        }

        if self.registry.is_committed(name) {
            return Err(AllocError::DoubleDeclaration {
                name: name.to_string(),
                defined: true,
                span,
            });
        }

        debug!(routine = name, base = self.config.scratch.base, "open routine");
        self.context = Some(RoutineContext::new(name, self.config.scratch, span));
        Ok(())
    }

    pub fn allocate_local(&mut self, name: &str, width: ByteCount, span: Span) -> Result<Offset, AllocError> {
        let ctx = Self::active(&mut self.context, ".local", span)?;
        let offset = ctx.allocate(name, width, span)?;
        trace!(routine = ctx.owner(), local = name, offset, width, "allocated local");
        Ok(offset)
    }

    pub fn declare_dependencies(&mut self, names: &[Spanned<String>], span: Span) -> Result<(), AllocError> {
        let ctx = Self::active(&mut self.context, ".uses", span)?;
        let warnings =
            resolver::resolve_dependencies(ctx, &self.registry, names, self.config.checks.strictness)?;
        for warning in warnings {
            self.record_warning(warning);
        }
        Ok(())
    }

    /// Export locals of the open routine, or of the routine that just closed.
    ///
    /// Exports of an open routine are held until it closes, so a routine that
    /// fails never publishes anything.
    pub fn export(&mut self, routine: &Spanned<String>, locals: &[Spanned<String>]) -> Result<(), AllocError> {
        if let Some(ctx) = self.context.as_mut().filter(|ctx| ctx.owner() == routine.node) {
            let mut offsets = Vec::with_capacity(locals.len());
            for local in locals {
                let offset = ctx.local(&local.node).map(|l| l.offset);
                offsets.push((local.clone(), offset.ok_or_else(|| unknown_local(routine, local))?));
            }
            for (local, offset) in offsets {
                trace!(routine = %routine.node, local = %local.node, offset, "staged export");
                ctx.stage_export(local, offset);
            }
            return Ok(());
        }

        let Some(layout) = self
            .just_closed
            .map(|i| &self.layouts[i])
            .filter(|layout| layout.name == routine.node)
        else {
            return Err(AllocError::misuse(
                Misuse::DetachedExport {
                    routine: routine.node.clone(),
                },
                routine.span,
            ));
        };

        let mut batch = Vec::with_capacity(locals.len());
        for local in locals {
            let offset = layout
                .local(&local.node)
                .map(|l| l.offset)
                .ok_or_else(|| unknown_local(routine, local))?;
            batch.push(ExportedSymbol::Local {
                routine: routine.node.clone(),
                local: local.node.clone(),
                offset,
            });
        }

        let spans: Vec<Span> = locals.iter().map(|l| l.span).collect();
        self.exports
            .publish_all(&batch)
            .map_err(|clash| collision(&routine.node, clash, &spans))?;
        for symbol in &batch {
            debug!(symbol = %symbol.scoped_name(), value = symbol.value(), "exported local");
        }
        Ok(())
    }

    /// Commit the open routine's high-water mark and return it
    pub fn close_routine(&mut self, span: Span) -> Result<Offset, AllocError> {
        let Some(ctx) = self.context.take() else {
            return Err(AllocError::misuse(
                Misuse::OutsideRoutine {
                    directive: ".endroutine",
                },
                span,
            ));
        };
        ctx.check_fits(u32::from(ctx.cursor()), span)?;

        let size = ctx.cursor();
        let mut batch = vec![ExportedSymbol::ScratchSize {
            routine: ctx.owner().to_string(),
            size,
        }];
        let mut spans = vec![span];
        for (local, offset) in ctx.staged_exports() {
            batch.push(ExportedSymbol::Local {
                routine: ctx.owner().to_string(),
                local: local.node.clone(),
                offset: *offset,
            });
            spans.push(local.span);
        }
        self.exports
            .publish_all(&batch)
            .map_err(|clash| collision(ctx.owner(), clash, &spans))?;

        self.registry.commit(ctx.owner(), size);
        debug!(
            routine = ctx.owner(),
            size,
            locals = ctx.locals().len(),
            exports = batch.len() - 1,
            dependencies = ctx.dependencies().len(),
            "closed routine"
        );

        self.layouts.push(ctx.into_layout());
        self.just_closed = Some(self.layouts.len() - 1);
        Ok(size)
    }

    /// Verify a call site. Never fails; findings land in [`Allocator::warnings`].
    pub fn call_site(&mut self, target: &str, span: Span) {
        if !self.config.checks.safe_calls {
            return;
        }
        if let Some(warning) = verifier::check_call(
            self.context.as_ref(),
            &self.registry,
            target,
            self.config.checks.strictness,
            span,
        ) {
            self.record_warning(warning);
        }
    }

    /// End of a translation unit: no routine may remain open
    pub fn finish_unit(&mut self) -> Result<(), AllocError> {
        self.just_closed = None;
        match self.context.take() {
            Some(ctx) => Err(AllocError::misuse(
                Misuse::UnclosedRoutine {
                    routine: ctx.owner().to_string(),
                },
                ctx.opened_at(),
            )),
            None => Ok(()),
        }
    }

    fn active<'c>(
        context: &'c mut Option<RoutineContext>,
        directive: &'static str,
        span: Span,
    ) -> Result<&'c mut RoutineContext, AllocError> {
        context
            .as_mut()
            .ok_or_else(|| AllocError::misuse(Misuse::OutsideRoutine { directive }, span))
    }

    fn record_warning(&mut self, warning: Warning) {
        warn!(routine = warning.routine(), "{}", warning);
        self.warnings.push(warning);
    }

    pub fn config(&self) -> &AllocConfig {
        &self.config
    }

    pub fn registry(&self) -> &RoutineRegistry {
        &self.registry
    }

    pub fn active_routine(&self) -> Option<&RoutineContext> {
        self.context.as_ref()
    }

    /// Layouts of closed routines, in closing order
    pub fn layouts(&self) -> &[RoutineLayout] {
        &self.layouts
    }

    pub fn layout(&self, routine: &str) -> Option<&RoutineLayout> {
        self.layouts.iter().find(|l| l.name == routine)
    }

    pub fn exports(&self) -> &SymbolExports {
        &self.exports
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }
}

fn unknown_local(routine: &Spanned<String>, local: &Spanned<String>) -> AllocError {
    AllocError::UnknownLocal {
        routine: routine.node.clone(),
        name: local.node.clone(),
        span: local.span,
    }
}

fn collision(routine: &str, clash: SymbolClash, spans: &[Span]) -> AllocError {
    AllocError::SymbolCollision {
        routine: routine.to_string(),
        symbol: clash.mangled,
        scoped: clash.incoming,
        existing: clash.existing,
        span: spans.get(clash.position).copied().unwrap_or_else(Span::dummy),
    }
}
