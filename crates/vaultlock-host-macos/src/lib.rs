//! macOS host adapter for vaultlock
//!
//! Provides:
//! - `log show` queries against the login window process
//! - Literal substring filtering and last-line selection

mod syslog;

pub use syslog::*;
