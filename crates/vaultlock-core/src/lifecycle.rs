//! Session lifecycle: writes and reads of the persisted session

use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::{info, warn};
use vaultlock_api::{LockReason, SessionRecord};
use vaultlock_store::{SessionKey, Store, StoreError, StoreResult};
use vaultlock_util::{format_timestamp, parse_timestamp};

/// Save, touch, and clear operations over the session store.
///
/// Every operation is safe to call when no session exists.
#[derive(Clone)]
pub struct SessionLifecycle {
    store: Arc<dyn Store>,
}

impl SessionLifecycle {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Persist credentials after a successful unlock.
    /// Token and hash are written in one transaction.
    pub fn save(&self, token: &str, verification_hash: &str) -> StoreResult<()> {
        self.store.set_many(&[
            (SessionKey::SessionToken, token),
            (SessionKey::VerificationHash, verification_hash),
        ])?;
        info!("Session saved");
        Ok(())
    }

    /// Remove the credentials, keeping last activity and lock reason
    pub fn clear(&self) -> StoreResult<()> {
        self.store
            .remove_many(&[SessionKey::SessionToken, SessionKey::VerificationHash])?;
        info!("Session cleared");
        Ok(())
    }

    /// Remove everything related to the session
    pub fn full_logout_clear(&self) -> StoreResult<()> {
        self.store.remove_many(&SessionKey::ALL)?;
        info!("Session removed on logout");
        Ok(())
    }

    /// Reset the timeout window
    pub fn touch(&self, now: DateTime<Local>) -> StoreResult<()> {
        self.store
            .set(SessionKey::LastActivityTime, &format_timestamp(&now))
    }

    /// Clear the credentials and remember why the vault locked
    ///
    /// Both happen in one write: on failure the credentials stay in place.
    pub fn record_lock(&self, reason: LockReason) -> StoreResult<()> {
        self.store.update(
            &[(SessionKey::LockReason, reason.as_str())],
            &[SessionKey::SessionToken, SessionKey::VerificationHash],
        )?;
        info!(reason = %reason, "Vault locked");
        Ok(())
    }

    /// Reason recorded by the last [`record_lock`](Self::record_lock)
    pub fn lock_reason(&self) -> StoreResult<Option<LockReason>> {
        let Some(value) = self.store.get(SessionKey::LockReason)? else {
            return Ok(None);
        };

        let reason = LockReason::parse(&value);
        if reason.is_none() {
            warn!(value = %value, "Ignoring unknown stored lock reason");
        }
        Ok(reason)
    }

    /// Read and remove the stored lock reason
    pub fn take_lock_reason(&self) -> StoreResult<Option<LockReason>> {
        let reason = self.lock_reason()?;
        self.store.remove(SessionKey::LockReason)?;
        Ok(reason)
    }

    /// Load the persisted session fields
    pub fn load_record(&self) -> StoreResult<SessionRecord> {
        let token = self.store.get(SessionKey::SessionToken)?;
        let verification_hash = self.store.get(SessionKey::VerificationHash)?;

        let last_activity_time = match self.store.get(SessionKey::LastActivityTime)? {
            Some(value) => match parse_timestamp(&value) {
                Some(at) => Some(at),
                None => {
                    return Err(StoreError::Corrupt {
                        key: SessionKey::LastActivityTime.as_str(),
                        value,
                    });
                }
            },
            None => None,
        };

        Ok(SessionRecord {
            token,
            verification_hash,
            last_activity_time,
        })
    }
}
