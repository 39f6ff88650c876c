//! Mock log query for testing

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::{HostError, HostResult, LogOutput, LogQuery};

/// Scripted reply for one mock query
#[derive(Debug, Clone)]
pub enum MockReply {
    Output(LogOutput),
    SpawnFailure(String),
}

/// A query received by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub lookback_hours: u32,
    pub filter: String,
}

/// Mock log query for unit/integration testing.
///
/// Replies are consumed in order; once the script runs out, every query
/// gets `fallback` (empty output, i.e. "no matching line", by default).
pub struct MockLogQuery {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,

    /// Reply used when the script is exhausted
    pub fallback: Arc<Mutex<MockReply>>,
}

impl MockLogQuery {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            fallback: Arc::new(Mutex::new(MockReply::Output(LogOutput::default()))),
        }
    }

    /// Mock that answers every query with the same line
    pub fn always(stdout: impl Into<String>) -> Self {
        let mock = Self::new();
        *mock.fallback.lock().unwrap() = MockReply::Output(LogOutput::line(stdout));
        mock
    }

    /// Queue a successful reply
    pub fn push_output(&self, output: LogOutput) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Output(output));
        self
    }

    /// Queue a reply with no matching line
    pub fn push_empty(&self) -> &Self {
        self.push_output(LogOutput::default())
    }

    /// Queue a failure to launch the query
    pub fn push_spawn_failure(&self, message: impl Into<String>) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::SpawnFailure(message.into()));
        self
    }

    /// All queries received so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Lookback windows of all queries received so far
    pub fn lookback_windows(&self) -> Vec<u32> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.lookback_hours)
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockLogQuery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogQuery for MockLogQuery {
    async fn query(&self, lookback_hours: u32, filter: &str) -> HostResult<LogOutput> {
        self.calls.lock().unwrap().push(MockCall {
            lookback_hours,
            filter: filter.to_string(),
        });

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.lock().unwrap().clone());

        match reply {
            MockReply::Output(output) => Ok(output),
            MockReply::SpawnFailure(message) => Err(HostError::SpawnFailed(message)),
        }
    }
}
