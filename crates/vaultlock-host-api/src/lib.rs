//! Host adapter trait interfaces for vaultlock
//!
//! This crate defines the capability-based interface between the decision
//! core and platform-specific system log access. It contains no platform
//! code itself.

mod mock;
mod traits;

pub use mock::*;
pub use traits::*;
