//! Timeout policy evaluation

use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use vaultlock_api::{LockDecision, LockReason, ProbeResult, SessionRecord, SystemEvent, TimeoutPolicy};
use vaultlock_host_api::LogQuery;
use vaultlock_util::format_duration;

use crate::SystemActivityProbe;

/// Decides whether a saved session must be treated as locked
pub struct TimeoutPolicyEvaluator {
    probe: SystemActivityProbe,
}

impl TimeoutPolicyEvaluator {
    pub fn new(query: Arc<dyn LogQuery>) -> Self {
        Self {
            probe: SystemActivityProbe::new(query),
        }
    }

    /// Evaluate `record` under `policy` at time `now`.
    ///
    /// Only [`TimeoutPolicy::OnSystemLock`] and [`TimeoutPolicy::OnSystemSleep`]
    /// query the system log. This never fails: every uncertainty resolves
    /// towards locking.
    pub async fn evaluate(
        &self,
        record: &SessionRecord,
        policy: TimeoutPolicy,
        now: DateTime<Local>,
    ) -> LockDecision {
        if !record.has_credentials() {
            debug!("No saved credentials, vault is locked");
            return LockDecision::locked_without_reason();
        }

        // First use after establishing the session is trusted
        let Some(last_activity) = record.last_activity_time else {
            return LockDecision::unlocked();
        };

        let decision = if let Some(event) = policy.system_event() {
            self.check_system_event(event, last_activity).await
        } else {
            match policy {
                TimeoutPolicy::Never => LockDecision::unlocked(),
                TimeoutPolicy::After(timeout) => {
                    if timeout_elapsed(last_activity, now, timeout) {
                        debug!(timeout = %format_duration(timeout), "Inactivity timeout elapsed");
                        LockDecision::locked(LockReason::Timeout)
                    } else {
                        LockDecision::unlocked()
                    }
                }
                // Immediately
                _ => LockDecision::locked(LockReason::Timeout),
            }
        };

        if decision.should_lock {
            info!(policy = %policy, reason = ?decision.reason, "Vault should lock");
        }
        decision
    }

    async fn check_system_event(
        &self,
        event: SystemEvent,
        last_activity: DateTime<Local>,
    ) -> LockDecision {
        let occurred = match self.probe.find_last_event(event.log_filter()).await {
            ProbeResult::Found(at) => at > last_activity,
            // Unreadable log: assume the event happened rather than fail open
            ProbeResult::Unknown => {
                debug!(event = ?event, "System event time unknown, assuming it occurred");
                true
            }
        };

        if occurred {
            LockDecision::locked(event.lock_reason())
        } else {
            LockDecision::unlocked()
        }
    }
}

/// Inclusive: exactly `timeout` after the last activity has elapsed.
fn timeout_elapsed(last_activity: DateTime<Local>, now: DateTime<Local>, timeout: Duration) -> bool {
    let elapsed = now.signed_duration_since(last_activity);
    match chrono::Duration::from_std(timeout) {
        Ok(timeout) => elapsed >= timeout,
        // Longer than chrono can represent
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use vaultlock_host_api::MockLogQuery;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 2, h, m, s).unwrap()
    }

    fn session(last_activity: Option<DateTime<Local>>) -> SessionRecord {
        SessionRecord {
            token: Some("token".into()),
            verification_hash: Some("hash".into()),
            last_activity_time: last_activity,
        }
    }

    fn evaluator(mock: &Arc<MockLogQuery>) -> TimeoutPolicyEvaluator {
        TimeoutPolicyEvaluator::new(mock.clone())
    }

    fn all_policies() -> Vec<TimeoutPolicy> {
        vec![
            TimeoutPolicy::Never,
            TimeoutPolicy::Immediately,
            TimeoutPolicy::OnSystemLock,
            TimeoutPolicy::OnSystemSleep,
            TimeoutPolicy::After(Duration::from_secs(60)),
        ]
    }

    #[tokio::test]
    async fn missing_credentials_always_lock() {
        let mock = Arc::new(MockLogQuery::new());
        let eval = evaluator(&mock);

        let records = [
            SessionRecord::default(),
            SessionRecord {
                token: Some("token".into()),
                last_activity_time: Some(at(9, 0, 0)),
                ..Default::default()
            },
            SessionRecord {
                verification_hash: Some("hash".into()),
                ..Default::default()
            },
        ];

        for record in &records {
            for policy in all_policies() {
                let decision = eval.evaluate(record, policy, at(9, 0, 1)).await;
                assert_eq!(decision, LockDecision::locked_without_reason());
            }
        }
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_activity_never_locks() {
        let mock = Arc::new(MockLogQuery::new());
        let eval = evaluator(&mock);

        for policy in all_policies() {
            let decision = eval.evaluate(&session(None), policy, at(23, 0, 0)).await;
            assert_eq!(decision, LockDecision::unlocked(), "policy {}", policy);
        }
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn never_policy_ignores_elapsed_time() {
        let mock = Arc::new(MockLogQuery::new());
        let now = at(9, 0, 0) + chrono::Duration::days(365);

        let decision = evaluator(&mock)
            .evaluate(&session(Some(at(9, 0, 0))), TimeoutPolicy::Never, now)
            .await;

        assert!(!decision.should_lock);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn immediately_always_locks() {
        let mock = Arc::new(MockLogQuery::new());

        let decision = evaluator(&mock)
            .evaluate(&session(Some(at(9, 0, 0))), TimeoutPolicy::Immediately, at(9, 0, 0))
            .await;

        assert_eq!(decision, LockDecision::locked(LockReason::Timeout));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn duration_boundary_is_inclusive() {
        let mock = Arc::new(MockLogQuery::new());
        let eval = evaluator(&mock);
        let record = session(Some(at(9, 0, 0)));
        let policy = TimeoutPolicy::After(Duration::from_millis(90_000));

        let before = eval
            .evaluate(&record, policy, at(9, 1, 30) - chrono::Duration::milliseconds(1))
            .await;
        assert_eq!(before, LockDecision::unlocked());

        let exact = eval.evaluate(&record, policy, at(9, 1, 30)).await;
        assert_eq!(exact, LockDecision::locked(LockReason::Timeout));

        let after = eval.evaluate(&record, policy, at(10, 0, 0)).await;
        assert_eq!(after, LockDecision::locked(LockReason::Timeout));

        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn clock_moving_backwards_does_not_lock() {
        let mock = Arc::new(MockLogQuery::new());

        let decision = evaluator(&mock)
            .evaluate(
                &session(Some(at(9, 0, 0))),
                TimeoutPolicy::After(Duration::from_secs(60)),
                at(8, 0, 0),
            )
            .await;

        assert!(!decision.should_lock);
    }

    #[tokio::test]
    async fn system_lock_after_last_activity_locks() {
        let mock = Arc::new(MockLogQuery::always(
            "2024-01-02 10:15:00 localhost loginwindow[1]: handleUnlockResult",
        ));

        let decision = evaluator(&mock)
            .evaluate(&session(Some(at(9, 0, 0))), TimeoutPolicy::OnSystemLock, at(10, 30, 0))
            .await;

        assert_eq!(decision, LockDecision::locked(LockReason::SystemLock));
        assert_eq!(mock.calls()[0].filter, "handleUnlockResult");
    }

    #[tokio::test]
    async fn system_lock_before_last_activity_stays_unlocked() {
        let mock = Arc::new(MockLogQuery::always(
            "2024-01-02 08:45:00 localhost loginwindow[1]: handleUnlockResult",
        ));

        let decision = evaluator(&mock)
            .evaluate(&session(Some(at(9, 0, 0))), TimeoutPolicy::OnSystemLock, at(10, 30, 0))
            .await;

        assert_eq!(decision, LockDecision::unlocked());
    }

    #[tokio::test]
    async fn event_at_same_instant_does_not_lock() {
        let mock = Arc::new(MockLogQuery::always("2024-01-02 09:00:00 sleep 0"));

        let decision = evaluator(&mock)
            .evaluate(&session(Some(at(9, 0, 0))), TimeoutPolicy::OnSystemSleep, at(9, 5, 0))
            .await;

        assert!(!decision.should_lock);
    }

    #[tokio::test]
    async fn unknown_probe_result_locks() {
        for last_activity in [at(0, 0, 0), at(23, 59, 59)] {
            let mock = Arc::new(MockLogQuery::new());

            let decision = evaluator(&mock)
                .evaluate(&session(Some(last_activity)), TimeoutPolicy::OnSystemLock, at(23, 59, 59))
                .await;

            assert_eq!(decision, LockDecision::locked(LockReason::SystemLock));
            assert_eq!(mock.call_count(), 6);
        }
    }

    #[tokio::test]
    async fn system_sleep_uses_sleep_filter() {
        let mock = Arc::new(MockLogQuery::new());
        mock.push_spawn_failure("spawn failed");

        let decision = evaluator(&mock)
            .evaluate(&session(Some(at(9, 0, 0))), TimeoutPolicy::OnSystemSleep, at(9, 5, 0))
            .await;

        assert_eq!(decision, LockDecision::locked(LockReason::SystemSleep));
        assert_eq!(mock.calls()[0].filter, "sleep 0");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn only_system_policies_read_the_log() {
        for policy in all_policies() {
            let mock = Arc::new(MockLogQuery::always("2024-01-02 08:00:00 entry"));

            evaluator(&mock)
                .evaluate(&session(Some(at(9, 0, 0))), policy, at(9, 0, 30))
                .await;

            let filters: Vec<String> = mock.calls().into_iter().map(|c| c.filter).collect();
            let expected: Vec<String> = policy
                .system_event()
                .map(|event| event.log_filter().to_string())
                .into_iter()
                .collect();
            assert_eq!(filters, expected, "policy {}", policy);
        }
    }

    #[test]
    fn huge_timeout_never_elapses() {
        assert!(!timeout_elapsed(at(0, 0, 0), at(23, 0, 0), Duration::MAX));
    }
}
