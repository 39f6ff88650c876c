//! Host adapter traits

use async_trait::async_trait;
use thiserror::Error;

/// Errors from host adapter operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// Raw output of one log query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOutput {
    pub stdout: String,
    pub stderr: String,
}

impl LogOutput {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Output with a single log line and no errors
    pub fn line(stdout: impl Into<String>) -> Self {
        Self::new(stdout, "")
    }

    /// True if the query wrote anything to its error channel
    pub fn has_errors(&self) -> bool {
        !self.stderr.trim().is_empty()
    }
}

/// One "show recent log lines" query against the system log.
///
/// Implementations return the most recent line containing `filter` within
/// the last `lookback_hours` hours, restricted to the login window process.
/// An empty `stdout` means nothing matched. `Err` is reserved for failures
/// to run the query at all.
#[async_trait]
pub trait LogQuery: Send + Sync {
    async fn query(&self, lookback_hours: u32, filter: &str) -> HostResult<LogOutput>;
}
