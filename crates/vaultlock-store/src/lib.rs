//! Persistence layer for vaultlock
//!
//! Provides key/value storage for the session fields:
//! - Session token and verification hash
//! - Last activity time
//! - Reason for the most recent lock

mod sqlite;
mod traits;

pub use sqlite::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt value for {key}: {value:?}")]
    Corrupt { key: &'static str, value: String },

    #[error("Store lock poisoned")]
    Poisoned,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
