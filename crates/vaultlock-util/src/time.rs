//! Time utilities for vaultlock
//!
//! All session timestamps are wall-clock `DateTime<Local>` values. They are
//! persisted as RFC 3339 strings and compared against system log entries,
//! which are also reported in local time.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `VAULTLOCK_MOCK_TIME` environment variable can be set
//! to override the system time for every timeout decision. This is useful
//! for checking duration policies without waiting for them to elapse.
//!
//! Mock time only shifts timestamps this process produces, such as the last
//! activity time written by `touch`. System log entries keep their real
//! times, so `system_lock` and `system_sleep` decisions compare shifted
//! activity against unshifted events while mock time is active.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-25 14:30:00`)
//!
//! Example:
//! ```bash
//! VAULTLOCK_MOCK_TIME="2025-12-25 14:30:00" vaultlock check
//! ```

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::sync::OnceLock;
use std::time::Duration;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "VAULTLOCK_MOCK_TIME";

/// Format accepted by [`MOCK_TIME_ENV_VAR`]
const MOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Cached mock time offset from the real time when the process started.
/// This allows mock time to advance naturally.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

#[allow(clippy::disallowed_methods)] // Wraps Local::now()
fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                match parse_local_naive(&mock_time_str, MOCK_TIME_FORMAT) {
                    Some(mock_dt) => {
                        let offset = mock_dt.signed_duration_since(chrono::Local::now());
                        tracing::info!(
                            mock_time = %mock_time_str,
                            offset_secs = offset.num_seconds(),
                            "Mock time enabled"
                        );
                        return Some(offset);
                    }
                    None => {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            expected_format = MOCK_TIME_FORMAT,
                            "Invalid mock time, using system time"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current local time, respecting mock time settings in debug builds.
///
/// The system log is not shifted along with it.
#[allow(clippy::disallowed_methods)]
pub fn now() -> DateTime<Local> {
    let real_now = chrono::Local::now();

    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// Format a timestamp for persistence (RFC 3339, millisecond precision).
pub fn format_timestamp(dt: &DateTime<Local>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, false)
}

/// Parse a persisted timestamp.
///
/// Accepts RFC 3339 (any offset, including `Z`) and, for values written
/// without an offset, a bare `YYYY-MM-DDTHH:MM:SS[.fff]` read as local time.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Local>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local));
    }
    parse_local_naive(value, "%Y-%m-%dT%H:%M:%S%.f")
}

/// Parse a naive date-time string and place it in the local timezone.
///
/// Returns `None` for unparseable input and for local times that do not
/// exist (spring-forward gaps). Ambiguous times resolve to the earlier one.
pub fn parse_local_naive(value: &str, format: &str) -> Option<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(value, format).ok()?;
    Local.from_local_datetime(&naive).earliest()
}

/// Format a timestamp for human display.
pub fn format_datetime_full(dt: &DateTime<Local>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Helper to format durations in human-readable form
pub fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
