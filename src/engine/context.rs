//! Routine Allocation Context
//!
//! The live state of the routine between `.routine` and `.endroutine`.
//! Locals are handed out from a cursor that only moves forward, so the
//! locals of one routine never overlap each other.

use rustc_hash::FxHashMap as HashMap;

use super::diagnostic::AllocError;
use crate::ast::{Span, Spanned};
use crate::config::{ByteCount, Offset, ScratchRegion};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    pub name: String,
    pub offset: Offset,
    pub width: ByteCount,
}

impl LocalVariable {
    /// One past the last byte
    pub fn end(&self) -> u32 {
        u32::from(self.offset) + u32::from(self.width)
    }

    pub fn overlaps(&self, other: &LocalVariable) -> bool {
        u32::from(self.offset) < other.end() && u32::from(other.offset) < self.end()
    }
}

/// Final shape of a closed routine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineLayout {
    pub name: String,
    pub size: Offset,
    pub dependencies: Vec<String>,
    /// Locals in allocation order
    pub locals: Vec<LocalVariable>,
}

impl RoutineLayout {
    pub fn local(&self, name: &str) -> Option<&LocalVariable> {
        self.locals.iter().find(|l| l.name == name)
    }
}

pub struct RoutineContext {
    owner: String,
    region: ScratchRegion,
    cursor: Offset,
    dependencies: Vec<String>,
    locals: Vec<LocalVariable>,
    by_name: HashMap<String, usize>,
    /// Locals exported while open; published only when the routine closes
    staged_exports: Vec<(Spanned<String>, Offset)>,
    /// Span of the `.routine` directive
    opened_at: Span,
}

impl RoutineContext {
    pub fn new(owner: impl Into<String>, region: ScratchRegion, opened_at: Span) -> Self {
        Self {
            owner: owner.into(),
            region,
            cursor: region.base,
            dependencies: Vec::new(),
            locals: Vec::new(),
            by_name: HashMap::default(),
            staged_exports: Vec::new(),
            opened_at,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn cursor(&self) -> Offset {
        self.cursor
    }

    pub fn opened_at(&self) -> Span {
        self.opened_at
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn depends_on(&self, routine: &str) -> bool {
        self.dependencies.iter().any(|d| d == routine)
    }

    pub fn locals(&self) -> &[LocalVariable] {
        &self.locals
    }

    pub fn local(&self, name: &str) -> Option<&LocalVariable> {
        self.by_name.get(name).map(|&i| &self.locals[i])
    }

    pub fn has_locals(&self) -> bool {
        !self.locals.is_empty()
    }

    /// Assign the next `width` bytes to `name`
    pub fn allocate(&mut self, name: &str, width: ByteCount, span: Span) -> Result<Offset, AllocError> {
        if width == 0 {
            return Err(AllocError::ZeroWidthLocal {
                routine: self.owner.clone(),
                name: name.to_string(),
                span,
            });
        }
        if self.by_name.contains_key(name) {
            return Err(AllocError::DuplicateLocal {
                routine: self.owner.clone(),
                name: name.to_string(),
                span,
            });
        }

        let end = u32::from(self.cursor) + u32::from(width);
        self.check_fits(end, span)?;

        let next = Offset::try_from(end).map_err(|_| self.overflow(end, span))?;

        let offset = self.cursor;
        self.by_name.insert(name.to_string(), self.locals.len());
        self.locals.push(LocalVariable {
            name: name.to_string(),
            offset,
            width,
        });
        self.cursor = next;
        Ok(offset)
    }

    /// Raise the cursor to at least `high_water`
    pub fn reserve(&mut self, high_water: Offset) {
        self.cursor = self.cursor.max(high_water);
    }

    /// Append to the dependency list; repeats are ignored
    pub fn record_dependency(&mut self, routine: &str) {
        if !self.depends_on(routine) {
            self.dependencies.push(routine.to_string());
        }
    }

    /// Fail if a cursor of `end` would run past the region or the address space
    pub fn check_fits(&self, end: u32, span: Span) -> Result<(), AllocError> {
        let limit = self.region.limit().min(u32::from(Offset::MAX));
        if end > limit {
            return Err(self.overflow(end, span));
        }
        Ok(())
    }

    fn overflow(&self, end: u32, span: Span) -> AllocError {
        AllocError::ScratchOverflow {
            routine: self.owner.clone(),
            required: end - u32::from(self.region.base),
            capacity: self.region.capacity,
            span,
        }
    }

    /// Hold an export of one of this routine's locals until close
    pub fn stage_export(&mut self, local: Spanned<String>, offset: Offset) {
        self.staged_exports.push((local, offset));
    }

    pub fn staged_exports(&self) -> &[(Spanned<String>, Offset)] {
        &self.staged_exports
    }

    pub fn into_layout(self) -> RoutineLayout {
        RoutineLayout {
            name: self.owner,
            size: self.cursor,
            dependencies: self.dependencies,
            locals: self.locals,
        }
    }
}
