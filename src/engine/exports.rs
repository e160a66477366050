//! Symbol Export Surface
//!
//! Symbols handed to the external linker. Every closed routine publishes its
//! committed size so other translation units can depend on it; exported
//! locals publish their offset under a routine-scoped name and a flat
//! mangled name.

use rustc_hash::FxHashMap as HashMap;
use serde::Serialize;

use crate::config::Offset;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportedSymbol {
    /// Committed scratch size of a closed routine
    ScratchSize { routine: String, size: Offset },
    /// Offset of an exported local
    Local {
        routine: String,
        local: String,
        offset: Offset,
    },
}

impl ExportedSymbol {
    /// Flat name; [`SymbolExports`] rejects two symbols sharing one
    pub fn mangled_name(&self) -> String {
        match self {
            ExportedSymbol::ScratchSize { routine, .. } => format!("__scratch_{}", routine),
            ExportedSymbol::Local { routine, local, .. } => format!("{}__{}", routine, local),
        }
    }

    /// Name inside the routine's scope
    pub fn scoped_name(&self) -> String {
        match self {
            ExportedSymbol::ScratchSize { routine, .. } => format!("{}::__scratch", routine),
            ExportedSymbol::Local { routine, local, .. } => format!("{}::{}", routine, local),
        }
    }

    pub fn value(&self) -> Offset {
        match self {
            ExportedSymbol::ScratchSize { size, .. } => *size,
            ExportedSymbol::Local { offset, .. } => *offset,
        }
    }

    pub fn routine(&self) -> &str {
        match self {
            ExportedSymbol::ScratchSize { routine, .. } | ExportedSymbol::Local { routine, .. } => routine,
        }
    }
}

#[derive(Serialize)]
struct SymbolRecord {
    name: String,
    scoped: String,
    value: Offset,
    kind: &'static str,
}

/// Two different symbols that mangle to the same flat name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolClash {
    /// Index into the rejected batch
    pub position: usize,
    pub mangled: String,
    pub existing: String,
    pub incoming: String,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolExports {
    symbols: Vec<ExportedSymbol>,
    /// Mangled name to scoped name
    names: HashMap<String, String>,
}

impl SymbolExports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish_size(&mut self, routine: &str, size: Offset) -> Result<(), SymbolClash> {
        self.publish_all(&[ExportedSymbol::ScratchSize {
            routine: routine.to_string(),
            size,
        }])
    }

    pub fn publish_local(&mut self, routine: &str, local: &str, offset: Offset) -> Result<(), SymbolClash> {
        self.publish_all(&[ExportedSymbol::Local {
            routine: routine.to_string(),
            local: local.to_string(),
            offset,
        }])
    }

    /// Publish a batch, or nothing if any symbol clashes.
    ///
    /// Re-publishing a symbol under the same scoped name is a no-op. A mangled
    /// name already bound to a different scoped name is a clash.
    pub fn publish_all(&mut self, batch: &[ExportedSymbol]) -> Result<(), SymbolClash> {
        let mut pending: HashMap<String, String> = HashMap::default();
        let mut fresh = Vec::new();

        for (position, symbol) in batch.iter().enumerate() {
            let mangled = symbol.mangled_name();
            let scoped = symbol.scoped_name();
            let bound = self.names.get(&mangled).or_else(|| pending.get(&mangled));
            match bound {
                Some(existing) if *existing == scoped => {}
                Some(existing) => {
                    return Err(SymbolClash {
                        position,
                        mangled,
                        existing: existing.clone(),
                        incoming: scoped,
                    });
                }
                None => {
                    pending.insert(mangled, scoped);
                    fresh.push(symbol.clone());
                }
            }
        }

        self.names.extend(pending);
        self.symbols.extend(fresh);
        Ok(())
    }

    pub fn get(&self, mangled: &str) -> Option<&ExportedSymbol> {
        self.symbols.iter().find(|s| s.mangled_name() == mangled)
    }

    pub fn symbols(&self) -> &[ExportedSymbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Assembler assignments, one per symbol, in publication order
    pub fn render_asm(&self) -> String {
        let mut out = String::from("; scratch symbols\n");
        for symbol in &self.symbols {
            out.push_str(&format!(
                "{} = {} ; {}\n",
                symbol.mangled_name(),
                format_hex(symbol.value()),
                symbol.scoped_name()
            ));
        }
        out
    }

    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        let records: Vec<SymbolRecord> = self
            .symbols
            .iter()
            .map(|s| SymbolRecord {
                name: s.mangled_name(),
                scoped: s.scoped_name(),
                value: s.value(),
                kind: match s {
                    ExportedSymbol::ScratchSize { .. } => "scratch_size",
                    ExportedSymbol::Local { .. } => "local",
                },
            })
            .collect();
        serde_json::to_string_pretty(&records)
    }
}

/// `$xx` for zero page values, `$xxxx` otherwise
pub fn format_hex(value: Offset) -> String {
    if value <= 0xFF {
        format!("${:02X}", value)
    } else {
        format!("${:04X}", value)
    }
}
