//! Shared utilities for vaultlock
//!
//! This crate provides:
//! - Wall-clock time with a debug-only mock override
//! - Timestamp formatting/parsing for persisted session fields
//! - Default paths for config and data directories

mod paths;
mod time;

pub use paths::*;
pub use time::*;
