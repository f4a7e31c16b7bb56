//! Failure taxonomy for one run.

use std::fmt;
use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Stdio channel whose plumbing failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamChannel {
    Stdout,
    Stderr,
    Stdin,
}

impl fmt::Display for StreamChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StreamChannel::Stdout => "stdout",
            StreamChannel::Stderr => "stderr",
            StreamChannel::Stdin => "stdin",
        })
    }
}

/// What went wrong with a run.
///
/// Every variant travels inside the aggregated outcome; the entry points
/// themselves never fail. Only [`TaskError::Exit`] carries an exit code.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The configuration carried an empty task string.
    #[error("task is empty")]
    EmptyTask,

    /// The interpreter could not be started at all.
    #[error("failed to launch {interpreter}: {source}")]
    Launch {
        interpreter: String,
        #[source]
        source: io::Error,
    },

    /// The child ran to completion with a non-zero status.
    #[error("process exited with code {code}")]
    Exit { code: i32 },

    /// A stdio pipe or feed failed while the child was running.
    #[error("{channel} stream failed: {source}")]
    Stream {
        channel: StreamChannel,
        #[source]
        source: io::Error,
    },

    /// Waiting on the child failed.
    #[error("failed to wait for child: {source}")]
    Wait {
        #[source]
        source: io::Error,
    },
}

impl TaskError {
    /// Exit code carried by the error, when the child reached one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            TaskError::Exit { code } => Some(*code),
            _ => None,
        }
    }
}

/// Numeric code for a finished child. Signal deaths use the shell
/// convention of `128 + signal`; a status with neither code nor signal
/// reports 1.
pub(crate) fn exit_code_of(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    status.code().unwrap_or(1)
}

/// Translate an exit status into the outcome error, if any.
pub(crate) fn status_error(status: ExitStatus) -> Option<TaskError> {
    if status.success() {
        None
    } else {
        Some(TaskError::Exit {
            code: exit_code_of(status),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_only_on_exit_variant() {
        let exit = TaskError::Exit { code: 127 };
        assert_eq!(exit.exit_code(), Some(127));

        let launch = TaskError::Launch {
            interpreter: "sh".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(launch.exit_code(), None);
        assert_eq!(TaskError::EmptyTask.exit_code(), None);
    }

    #[test]
    fn test_display_carries_code_and_channel() {
        assert_eq!(
            TaskError::Exit { code: 3 }.to_string(),
            "process exited with code 3"
        );
        let stream = TaskError::Stream {
            channel: StreamChannel::Stderr,
            source: io::Error::new(io::ErrorKind::BrokenPipe, "gone"),
        };
        assert!(stream.to_string().starts_with("stderr stream failed"));
    }

    #[cfg(unix)]
    #[test]
    fn test_status_error_reports_child_code() {
        use std::os::unix::process::ExitStatusExt;
        // wait(2) encoding: exit code lives in the high byte.
        let status = ExitStatus::from_raw(3 << 8);
        match status_error(status) {
            Some(TaskError::Exit { code }) => assert_eq!(code, 3),
            other => panic!("expected exit error, got {other:?}"),
        }
        assert!(status_error(ExitStatus::from_raw(0)).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_death_uses_shell_convention() {
        use std::os::unix::process::ExitStatusExt;
        // raw status 9 means "killed by SIGKILL".
        let status = ExitStatus::from_raw(9);
        assert_eq!(exit_code_of(status), 128 + 9);
    }
}
