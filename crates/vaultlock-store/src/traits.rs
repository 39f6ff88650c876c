//! Store trait definitions

use crate::StoreResult;

/// Logical keys of the persisted session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    SessionToken,
    VerificationHash,
    /// RFC 3339 timestamp
    LastActivityTime,
    LockReason,
}

impl SessionKey {
    pub const ALL: [SessionKey; 4] = [
        SessionKey::SessionToken,
        SessionKey::VerificationHash,
        SessionKey::LastActivityTime,
        SessionKey::LockReason,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKey::SessionToken => "session_token",
            SessionKey::VerificationHash => "verification_hash",
            SessionKey::LastActivityTime => "last_activity_time",
            SessionKey::LockReason => "vault_lock_reason",
        }
    }
}

/// Session key/value store.
///
/// Multi-key writes are atomic: readers never observe part of an
/// `update`. Removing a missing key is a no-op.
pub trait Store: Send + Sync {
    /// Get a value
    fn get(&self, key: SessionKey) -> StoreResult<Option<String>>;

    /// Set `entries` and remove `keys` in one transaction
    fn update(&self, entries: &[(SessionKey, &str)], keys: &[SessionKey]) -> StoreResult<()>;

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;

    /// Set several values in one transaction
    fn set_many(&self, entries: &[(SessionKey, &str)]) -> StoreResult<()> {
        self.update(entries, &[])
    }

    /// Remove several values in one transaction
    fn remove_many(&self, keys: &[SessionKey]) -> StoreResult<()> {
        self.update(&[], keys)
    }

    /// Set a single value
    fn set(&self, key: SessionKey, value: &str) -> StoreResult<()> {
        self.set_many(&[(key, value)])
    }

    /// Remove a single value
    fn remove(&self, key: SessionKey) -> StoreResult<()> {
        self.remove_many(&[key])
    }
}
