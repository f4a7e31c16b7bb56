//! Run handle and aggregated outcome.

use crate::config::Encoding;
use crate::error::TaskError;
use crate::stdio::Captured;
use std::io;
use tokio::task::JoinHandle;

/// Aggregated result of one run, produced exactly once.
///
/// A non-zero exit sets `error` without discarding the captured output;
/// callers branch on [`TaskError::exit_code`] and still read both
/// channels.
#[derive(Debug)]
pub struct TaskOutcome {
    /// Launch failure, non-zero exit, or stream failure. `None` on a clean
    /// zero-status run.
    pub error: Option<TaskError>,
    /// Captured stdout; empty for inherited channels.
    pub stdout: Captured,
    /// Captured stderr; empty for inherited channels.
    pub stderr: Captured,
}

impl TaskOutcome {
    /// True when the run finished with status zero and clean plumbing.
    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// Exit code of the child: `Some(0)` on success, the child's code on a
    /// non-zero exit, `None` when the run never reached one.
    pub fn exit_code(&self) -> Option<i32> {
        match &self.error {
            None => Some(0),
            Some(error) => error.exit_code(),
        }
    }

    pub(crate) fn failed(error: TaskError, encoding: Encoding) -> Self {
        Self {
            error: Some(error),
            stdout: Captured::empty(encoding),
            stderr: Captured::empty(encoding),
        }
    }
}

/// Handle to a launched run.
///
/// `join` waits for the aggregated outcome. Dropping the handle instead
/// detaches the run: the child still runs to completion and configured
/// sinks keep receiving output, while any error is silently discarded.
#[derive(Debug)]
pub struct TaskHandle {
    pid: Option<u32>,
    encoding: Encoding,
    outcome: JoinHandle<TaskOutcome>,
}

impl TaskHandle {
    pub(crate) fn new(
        pid: Option<u32>,
        encoding: Encoding,
        outcome: JoinHandle<TaskOutcome>,
    ) -> Self {
        Self {
            pid,
            encoding,
            outcome,
        }
    }

    /// Pre-resolved handle for failures before or during launch.
    pub(crate) fn failed(error: TaskError, encoding: Encoding) -> Self {
        let outcome = tokio::spawn(async move { TaskOutcome::failed(error, encoding) });
        Self::new(None, encoding, outcome)
    }

    /// OS pid of the child, when the launch succeeded.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Wait for the run to finish and take its outcome.
    pub async fn join(self) -> TaskOutcome {
        match self.outcome.await {
            Ok(outcome) => outcome,
            Err(join_error) => TaskOutcome::failed(
                TaskError::Wait {
                    source: io::Error::other(join_error),
                },
                self.encoding,
            ),
        }
    }

    /// Let the run finish on its own; the outcome is discarded.
    pub fn detach(self) {}
}
