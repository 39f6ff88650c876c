//! Shared types for vaultlock
//!
//! This crate defines the values passed between the store, the probe, the
//! evaluator, and callers:
//! - Timeout policies
//! - Saved session records
//! - Lock decisions and reasons
//! - System event classes and probe results

mod types;

pub use types::*;
