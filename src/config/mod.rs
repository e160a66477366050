//! Session configuration
//!
//! Scratch region geometry and diagnostic strictness. Values come from
//! `zpalloc.toml` in the working directory when present; every key is
//! optional and falls back to the defaults below.
//!
//! ```toml
//! [scratch]
//! base = 0x40
//! capacity = 0x40
//!
//! [checks]
//! strictness = 2
//! safe_calls = true
//! implicit_declarations = false
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Byte offset into the scratch region's address space
pub type Offset = u16;

/// Number of bytes
pub type ByteCount = u16;

/// Name of the configuration file looked up by [`AllocConfig::load_or_default`]
pub const CONFIG_FILE: &str = "zpalloc.toml";

/// The shared scratch window routines allocate their locals from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScratchRegion {
    pub base: Offset,
    pub capacity: ByteCount,
}

impl ScratchRegion {
    pub fn new(base: Offset, capacity: ByteCount) -> Self {
        Self { base, capacity }
    }

    /// One past the last usable byte
    pub fn limit(&self) -> u32 {
        u32::from(self.base) + u32::from(self.capacity)
    }

    pub fn contains(&self, addr: Offset) -> bool {
        u32::from(addr) >= u32::from(self.base) && u32::from(addr) < self.limit()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 || self.limit() > u32::from(Offset::MAX) {
            return Err(ConfigError::InvalidRegion {
                base: self.base,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

impl Default for ScratchRegion {
    /// `$40-$7F`, the variable area of the default zero page layout
    fn default() -> Self {
        Self {
            base: 0x40,
            capacity: 0x40,
        }
    }
}

/// How loudly advisory checks report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(try_from = "u8")]
pub enum Strictness {
    /// No advisory warnings
    Silent = 0,
    /// Warn about calls to routines that were not declared as dependencies
    Calls = 1,
    /// Also warn about dependencies declared after locals
    #[default]
    Pedantic = 2,
}

impl TryFrom<u8> for Strictness {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Strictness::Silent),
            1 => Ok(Strictness::Calls),
            2 => Ok(Strictness::Pedantic),
            other => Err(format!("strictness must be 0, 1 or 2, got {}", other)),
        }
    }
}

impl std::fmt::Display for Strictness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Checks {
    pub strictness: Strictness,
    /// Verify call sites against declared dependencies
    pub safe_calls: bool,
    /// Let `.routine` declare names that were never forward-declared
    pub implicit_declarations: bool,
}

impl Default for Checks {
    fn default() -> Self {
        Self {
            strictness: Strictness::default(),
            safe_calls: true,
            implicit_declarations: false,
        }
    }
}

/// Everything the allocator reads once per session
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AllocConfig {
    pub scratch: ScratchRegion,
    pub checks: Checks,
}

impl AllocConfig {
    pub fn new(scratch: ScratchRegion) -> Self {
        Self {
            scratch,
            checks: Checks::default(),
        }
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.checks.strictness = strictness;
        self
    }

    pub fn with_safe_calls(mut self, enabled: bool) -> Self {
        self.checks.safe_calls = enabled;
        self
    }

    pub fn with_implicit_declarations(mut self, enabled: bool) -> Self {
        self.checks.implicit_declarations = enabled;
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AllocConfig = toml::from_str(text)?;
        config.scratch.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load `zpalloc.toml` from the working directory, or use defaults
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("scratch region base ${base:04X} with capacity {capacity} does not fit in the 16-bit address space")]
    InvalidRegion { base: Offset, capacity: ByteCount },
}
