//! Integration tests for vaultlock
//!
//! These tests drive the session guard end to end: config, an on-disk
//! store, and a scripted system log.

use chrono::{DateTime, Local, TimeZone};
use std::sync::Arc;
use std::time::Duration;
use vaultlock_api::{LockDecision, LockReason, SessionRecord, TimeoutPolicy};
use vaultlock_config::parse_config;
use vaultlock_core::SessionGuard;
use vaultlock_host_api::{LogOutput, MockLogQuery};
use vaultlock_store::{SqliteStore, Store};

fn at(h: u32, m: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 1, 2, h, m, 0).unwrap()
}

fn make_guard(store: Arc<dyn Store>) -> (Arc<MockLogQuery>, SessionGuard) {
    let mock = Arc::new(MockLogQuery::new());
    let guard = SessionGuard::new(store, mock.clone());
    (mock, guard)
}

#[tokio::test]
async fn test_unlock_then_timeout_then_relock() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn Store> = Arc::new(SqliteStore::open(dir.path().join("session.db")).unwrap());
    let (mock, guard) = make_guard(store);

    let config = parse_config(
        r#"
        config_version = 1

        [vault]
        timeout = 300000
        "#,
    )
    .unwrap();
    let policy = config.vault.timeout;

    // Never unlocked
    let saved = guard.check(policy, at(9, 0)).await;
    assert_eq!(saved.decision, LockDecision::locked_without_reason());

    // Unlock: first use after saving is trusted
    guard.lifecycle().save("token", "hash").unwrap();
    let saved = guard.check(policy, at(9, 0)).await;
    assert!(!saved.decision.should_lock);

    guard.lifecycle().touch(at(9, 0)).unwrap();
    assert!(!guard.check(policy, at(9, 4)).await.decision.should_lock);

    // Five minutes later the vault times out
    let saved = guard.check(policy, at(9, 5)).await;
    assert_eq!(saved.decision, LockDecision::locked(LockReason::Timeout));

    guard.lifecycle().record_lock(LockReason::Timeout).unwrap();
    let saved = guard.check(policy, at(9, 6)).await;
    assert_eq!(saved.decision, LockDecision::locked_without_reason());
    assert_eq!(
        guard.lifecycle().take_lock_reason().unwrap(),
        Some(LockReason::Timeout)
    );

    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_system_lock_policy_reads_log() {
    let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
    let (mock, guard) = make_guard(store);

    guard.lifecycle().save("token", "hash").unwrap();
    guard.lifecycle().touch(at(9, 0)).unwrap();

    // First window is empty, the second finds the unlock
    mock.push_empty().push_output(LogOutput::line(
        "2024-01-02 10:15:00.000000 localhost loginwindow[96]: -[LWScreenLock handleUnlockResult:]",
    ));

    let saved = guard.check(TimeoutPolicy::OnSystemLock, at(23, 0)).await;

    assert_eq!(saved.decision, LockDecision::locked(LockReason::SystemLock));
    assert_eq!(saved.record.last_activity_time, Some(at(9, 0)));
    assert_eq!(mock.lookback_windows(), vec![1, 3]);
}

#[tokio::test]
async fn test_system_sleep_unknown_fails_locked() {
    let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
    let (mock, guard) = make_guard(store);

    guard.lifecycle().save("token", "hash").unwrap();
    guard.lifecycle().touch(at(9, 0)).unwrap();

    let saved = guard.check(TimeoutPolicy::OnSystemSleep, at(9, 1)).await;

    assert_eq!(saved.decision, LockDecision::locked(LockReason::SystemSleep));
    assert_eq!(mock.lookback_windows(), vec![1, 3, 5, 7, 9, 11]);
}

#[tokio::test]
async fn test_logout_matches_never_established_session() {
    let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
    let (_, guard) = make_guard(store.clone());
    let (_, fresh) = make_guard(Arc::new(SqliteStore::in_memory().unwrap()));

    guard.lifecycle().save("token", "hash").unwrap();
    guard.lifecycle().touch(at(9, 0)).unwrap();
    guard.lifecycle().record_lock(LockReason::SystemLock).unwrap();
    guard.lifecycle().full_logout_clear().unwrap();

    let policies = [
        TimeoutPolicy::Never,
        TimeoutPolicy::Immediately,
        TimeoutPolicy::OnSystemLock,
        TimeoutPolicy::OnSystemSleep,
        TimeoutPolicy::After(Duration::from_secs(60)),
    ];

    for policy in policies {
        let after_logout = guard.check(policy, at(10, 0)).await;
        let never = fresh.check(policy, at(10, 0)).await;
        assert_eq!(after_logout, never);
        assert_eq!(after_logout.record, SessionRecord::default());
    }
    assert_eq!(guard.lifecycle().lock_reason().unwrap(), None);
}
