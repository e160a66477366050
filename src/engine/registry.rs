//! Global Routine Registry
//!
//! Session-wide table of routine names. An entry is created by the first
//! declaration and finalized when the routine closes; entries are never
//! removed, so later translation units see everything earlier ones
//! committed.

use rustc_hash::FxHashMap as HashMap;

use super::diagnostic::Unresolved;
use crate::config::Offset;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoutineRecord {
    pub exists: bool,
    /// High-water mark of the routine's scratch usage, set once at close
    pub committed_stack_size: Option<Offset>,
}

/// Returned when a name is declared a second time
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("routine already declared")]
pub struct AlreadyDeclared;

#[derive(Debug, Clone, Default)]
pub struct RoutineRegistry {
    records: HashMap<String, RoutineRecord>,
}

impl RoutineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as existing
    pub fn declare(&mut self, name: &str) -> Result<(), AlreadyDeclared> {
        let record = self.records.entry(name.to_string()).or_default();
        if record.exists {
            return Err(AlreadyDeclared);
        }
        record.exists = true;
        Ok(())
    }

    /// Store the committed size of a closed routine. The first commit wins.
    pub fn commit(&mut self, name: &str, size: Offset) {
        let record = self.records.entry(name.to_string()).or_default();
        debug_assert!(record.exists, "commit of undeclared routine '{}'", name);
        debug_assert!(
            record.committed_stack_size.is_none(),
            "routine '{}' committed twice",
            name
        );
        if record.committed_stack_size.is_none() {
            record.committed_stack_size = Some(size);
        }
    }

    /// Committed size of a closed routine
    pub fn lookup_size(&self, name: &str) -> Result<Offset, Unresolved> {
        match self.records.get(name) {
            Some(RoutineRecord {
                exists: true,
                committed_stack_size: Some(size),
            }) => Ok(*size),
            Some(RoutineRecord { exists: true, .. }) => Err(Unresolved::NotClosed),
            _ => Err(Unresolved::NeverDeclared),
        }
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.records.get(name).is_some_and(|r| r.exists)
    }

    pub fn is_committed(&self, name: &str) -> bool {
        self.records
            .get(name)
            .is_some_and(|r| r.committed_stack_size.is_some())
    }

    pub fn get(&self, name: &str) -> Option<&RoutineRecord> {
        self.records.get(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over all records, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RoutineRecord)> {
        self.records.iter().map(|(name, record)| (name.as_str(), record))
    }
}
