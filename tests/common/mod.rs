//! Common test infrastructure for zpalloc tests
//!
//! This module provides shared utilities, helpers, and fixtures
//! used across the test suite.

pub mod fixtures;

// Re-export commonly used items
pub use assertions::*;
pub use harness::*;
