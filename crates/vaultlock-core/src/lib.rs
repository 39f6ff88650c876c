//! Auto-lock decision engine for vaultlock
//!
//! This crate is the heart of vaultlock, containing:
//! - Timeout policy evaluation (should the vault be locked, and why)
//! - The system activity probe (screen unlock / sleep lookups with widening retries)
//! - Session lifecycle writes (save, touch, clear, logout)
//! - The store-backed session guard tying them together

mod evaluator;
mod guard;
mod lifecycle;
mod probe;

pub use evaluator::*;
pub use guard::*;
pub use lifecycle::*;
pub use probe::*;
