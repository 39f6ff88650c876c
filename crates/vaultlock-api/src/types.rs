//! Shared types for the vaultlock API

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Rule deciding when an idle session is considered stale.
///
/// Exactly one policy is active per evaluation. It is resolved by the caller
/// (usually from config) and passed in explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// Sessions never time out
    Never,
    /// Every evaluation with a recorded activity locks
    Immediately,
    /// Lock if the screen was unlocked since the last activity
    OnSystemLock,
    /// Lock if the system slept since the last activity
    OnSystemSleep,
    /// Lock once this much time has passed since the last activity
    After(Duration),
}

impl TimeoutPolicy {
    /// The system event this policy depends on, if any.
    ///
    /// Only these policies ever touch the system log.
    pub fn system_event(&self) -> Option<SystemEvent> {
        match self {
            TimeoutPolicy::OnSystemLock => Some(SystemEvent::ScreenUnlock),
            TimeoutPolicy::OnSystemSleep => Some(SystemEvent::Sleep),
            _ => None,
        }
    }
}

impl fmt::Display for TimeoutPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeoutPolicy::Never => f.write_str("never"),
            TimeoutPolicy::Immediately => f.write_str("immediately"),
            TimeoutPolicy::OnSystemLock => f.write_str("system_lock"),
            TimeoutPolicy::OnSystemSleep => f.write_str("system_sleep"),
            TimeoutPolicy::After(d) => write!(f, "{}ms", d.as_millis()),
        }
    }
}

/// Why a vault was locked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockReason {
    Timeout,
    SystemLock,
    SystemSleep,
}

impl LockReason {
    /// Stable identifier, used for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            LockReason::Timeout => "timeout",
            LockReason::SystemLock => "system_lock",
            LockReason::SystemSleep => "system_sleep",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "timeout" => Some(LockReason::Timeout),
            "system_lock" => Some(LockReason::SystemLock),
            "system_sleep" => Some(LockReason::SystemSleep),
            _ => None,
        }
    }

    /// Message shown on the lock screen
    pub fn message(&self) -> &'static str {
        match self {
            LockReason::Timeout => "Vault timed out due to inactivity",
            LockReason::SystemLock => "Screen was locked",
            LockReason::SystemSleep => "System went to sleep",
        }
    }
}

impl fmt::Display for LockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating a saved session against a timeout policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockDecision {
    pub should_lock: bool,
    /// Set only when `should_lock` is true and the cause is attributable
    pub reason: Option<LockReason>,
}

impl LockDecision {
    pub fn unlocked() -> Self {
        Self {
            should_lock: false,
            reason: None,
        }
    }

    pub fn locked(reason: LockReason) -> Self {
        Self {
            should_lock: true,
            reason: Some(reason),
        }
    }

    /// Locked with no attributable cause (no session to evaluate).
    /// Callers should ask for full re-authentication, not a reprompt.
    pub fn locked_without_reason() -> Self {
        Self {
            should_lock: true,
            reason: None,
        }
    }
}

/// Persisted proof that the vault was unlocked once
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: Option<String>,
    pub verification_hash: Option<String>,
    pub last_activity_time: Option<DateTime<Local>>,
}

impl SessionRecord {
    /// Whether both credentials are present.
    pub fn has_credentials(&self) -> bool {
        self.token.is_some() && self.verification_hash.is_some()
    }
}

/// System event classes found in the login window log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemEvent {
    ScreenUnlock,
    Sleep,
}

impl SystemEvent {
    /// Literal substring identifying the event in log lines
    pub fn log_filter(&self) -> &'static str {
        match self {
            SystemEvent::ScreenUnlock => "handleUnlockResult",
            SystemEvent::Sleep => "sleep 0",
        }
    }

    pub fn lock_reason(&self) -> LockReason {
        match self {
            SystemEvent::ScreenUnlock => LockReason::SystemLock,
            SystemEvent::Sleep => LockReason::SystemSleep,
        }
    }
}

/// Outcome of looking up the most recent system event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "at", rename_all = "snake_case")]
pub enum ProbeResult {
    /// Most recent matching event
    Found(DateTime<Local>),
    /// Log unavailable or unparseable after exhausting retries
    Unknown,
}
