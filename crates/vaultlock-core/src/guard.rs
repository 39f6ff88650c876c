//! Store-backed session check

use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::warn;
use vaultlock_api::{LockDecision, SessionRecord, TimeoutPolicy};
use vaultlock_host_api::LogQuery;
use vaultlock_store::Store;

use crate::{SessionLifecycle, TimeoutPolicyEvaluator};

/// Saved session state together with the lock decision for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSession {
    pub record: SessionRecord,
    pub decision: LockDecision,
}

/// Entry point for callers about to perform a sensitive action
pub struct SessionGuard {
    lifecycle: SessionLifecycle,
    evaluator: TimeoutPolicyEvaluator,
}

impl SessionGuard {
    pub fn new(store: Arc<dyn Store>, query: Arc<dyn LogQuery>) -> Self {
        Self {
            lifecycle: SessionLifecycle::new(store),
            evaluator: TimeoutPolicyEvaluator::new(query),
        }
    }

    pub fn lifecycle(&self) -> &SessionLifecycle {
        &self.lifecycle
    }

    /// Load the saved session and decide whether it must be locked.
    ///
    /// Only reads from the store, so dropping the returned future part-way
    /// leaves nothing half-written. A session that cannot be loaded is
    /// reported as locked.
    pub async fn check(&self, policy: TimeoutPolicy, now: DateTime<Local>) -> SavedSession {
        let record = match self.lifecycle.load_record() {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Failed to load saved session, treating vault as locked");
                return SavedSession {
                    record: SessionRecord::default(),
                    decision: LockDecision::locked_without_reason(),
                };
            }
        };

        let decision = self.evaluator.evaluate(&record, policy, now).await;
        SavedSession { record, decision }
    }
}
