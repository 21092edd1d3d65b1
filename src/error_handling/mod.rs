//! Error handling and resolution statistics.
//!
//! This module provides:
//! - Typed start-up errors (`InitializationError`, `ConfigError`)
//! - Per-status resolution counters (`ResolutionStats`)

mod stats;
mod types;

// Re-export public API
pub use stats::ResolutionStats;
pub use types::{ConfigError, InitializationError};
