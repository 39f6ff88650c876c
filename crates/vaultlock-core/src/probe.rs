//! System activity probe
//!
//! Finds the most recent occurrence of a system event (screen unlock, sleep)
//! in the system log. Log queries are slow, and slower the further back they
//! look, so the probe starts with a one hour window and widens it on every
//! miss until the retry cap is reached.

use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::{debug, error};
use vaultlock_api::ProbeResult;
use vaultlock_host_api::LogQuery;
use vaultlock_util::parse_local_naive;

/// Lookback window of the first query
pub const INITIAL_LOOKBACK_HOURS: u32 = 1;

/// Added to the lookback window after each miss
pub const LOOKBACK_INCREMENT_HOURS: u32 = 2;

/// Retries after the initial query
pub const MAX_RETRIES: u32 = 5;

/// Retrying lookup of system events in the system log
pub struct SystemActivityProbe {
    query: Arc<dyn LogQuery>,
}

impl SystemActivityProbe {
    pub fn new(query: Arc<dyn LogQuery>) -> Self {
        Self { query }
    }

    /// Find the most recent log line containing `event_filter`.
    ///
    /// Attempts run strictly one after another. Error output, an empty
    /// result, or an unparseable line widen the window and retry. A query
    /// that cannot run at all ends the lookup. Neither case surfaces as an
    /// error: both resolve to [`ProbeResult::Unknown`].
    pub async fn find_last_event(&self, event_filter: &str) -> ProbeResult {
        let mut lookback_hours = INITIAL_LOOKBACK_HOURS;

        for attempt in 0..=MAX_RETRIES {
            let output = match self.query.query(lookback_hours, event_filter).await {
                Ok(output) => output,
                Err(e) => {
                    error!(
                        error = %e,
                        filter = event_filter,
                        lookback_hours,
                        "Failed to query system log"
                    );
                    return ProbeResult::Unknown;
                }
            };

            if output.has_errors() {
                debug!(
                    attempt,
                    lookback_hours,
                    stderr = %output.stderr.trim(),
                    "System log query reported errors"
                );
            } else if let Some(at) = last_line(&output.stdout).and_then(parse_log_timestamp) {
                debug!(attempt, lookback_hours, at = %at, filter = event_filter, "System event found");
                return ProbeResult::Found(at);
            } else {
                debug!(attempt, lookback_hours, filter = event_filter, "No usable log line");
            }

            lookback_hours += LOOKBACK_INCREMENT_HOURS;
        }

        debug!(filter = event_filter, "Max retry attempts reached to get last system event");
        ProbeResult::Unknown
    }
}

fn last_line(stdout: &str) -> Option<&str> {
    stdout.lines().rev().find(|line| !line.trim().is_empty())
}

/// Parse the leading date and time tokens of a syslog-style line.
///
/// `2024-01-02 10:15:00.123456-0800 localhost loginwindow[..]` carries an
/// offset and is converted to local time; `2024-01-02 10:15:00 ...` is read
/// as local time.
pub fn parse_log_timestamp(line: &str) -> Option<DateTime<Local>> {
    let mut tokens = line.split_whitespace();
    let date = tokens.next()?;
    let time = tokens.next()?;
    let stamp = format!("{} {}", date, time);

    if let Ok(dt) = DateTime::parse_from_str(&stamp, "%Y-%m-%d %H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Local));
    }
    parse_local_naive(&stamp, "%Y-%m-%d %H:%M:%S%.f")
}
