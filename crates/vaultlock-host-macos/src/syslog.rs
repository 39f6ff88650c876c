//! System log queries via `log show`

use async_trait::async_trait;
use shell_escape::escape;
use std::borrow::Cow;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use vaultlock_host_api::{HostError, HostResult, LogOutput, LogQuery};

/// Default `log` binary
const DEFAULT_LOG_PROGRAM: &str = "/usr/bin/log";

/// Process whose log entries record screen unlocks and sleep
const LOGIN_WINDOW_PROCESS: &str = "loginwindow";

/// Queries the unified system log for login window events.
///
/// Runs `log show --style syslog` over the lookback window, keeps lines
/// containing the filter, and returns the last one. Each line starts with
/// the date and time of the entry.
pub struct SyslogQuery {
    log_program: PathBuf,
    process: String,
}

impl SyslogQuery {
    pub fn new() -> Self {
        Self {
            log_program: PathBuf::from(DEFAULT_LOG_PROGRAM),
            process: LOGIN_WINDOW_PROCESS.to_string(),
        }
    }

    /// Use a different `log` binary
    pub fn with_log_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.log_program = program.into();
        self
    }

    /// Shell pipeline for one query
    pub fn pipeline(&self, lookback_hours: u32, filter: &str) -> String {
        let program = self.log_program.to_string_lossy();
        let predicate = format!("process == '{}'", self.process);

        format!(
            "{} show --style syslog --predicate {} --info --last {}h | grep -F -- {} | tail -n 1",
            escape(program),
            escape(Cow::from(predicate)),
            lookback_hours,
            escape(Cow::from(filter)),
        )
    }
}

impl Default for SyslogQuery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogQuery for SyslogQuery {
    async fn query(&self, lookback_hours: u32, filter: &str) -> HostResult<LogOutput> {
        let pipeline = self.pipeline(lookback_hours, filter);
        debug!(lookback_hours, filter, "Querying system log");

        // Killed if the caller abandons the evaluation
        let output = Command::new("/bin/sh")
            .arg("-c")
            .arg(&pipeline)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| HostError::SpawnFailed(format!("Failed to run log query: {}", e)))?;

        debug!(
            status = ?output.status.code(),
            stdout_len = output.stdout.len(),
            "System log query finished"
        );

        Ok(LogOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
