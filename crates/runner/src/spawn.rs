//! Streaming executor: explicit shell invocation with incremental
//! collection, live tee, piped stdin, and the completion join.

use crate::command::{build, ensure_interpreter, explicit_shell};
use crate::config::TaskConfig;
use crate::error::{status_error, StreamChannel, TaskError};
use crate::stdio::{feed_stdin, pump, Captured, Pumped, Sink};
use crate::task::{TaskHandle, TaskOutcome};
use taskpipe_common::{compose_run_env, default_tool_dirs};
use tokio::io::AsyncRead;
use tokio::process::Child;
use tracing::{debug, warn};
use uuid::Uuid;

/// Run a task through an explicit shell, collecting stdout and stderr as
/// they arrive and mirroring them to configured sinks.
///
/// The outcome resolves only after the child has exited, both output
/// channels have drained, and a configured stdin feed has reached its own
/// end-of-stream, in whatever order those signals fire. Must be called
/// within a Tokio runtime.
pub fn spawn(command: impl Into<TaskConfig>) -> TaskHandle {
    let config = command.into().normalized();
    let encoding = config.encoding;
    if config.task.is_empty() {
        return TaskHandle::failed(TaskError::EmptyTask, encoding);
    }

    let shell = explicit_shell();
    if let Err(error) = ensure_interpreter(shell) {
        return TaskHandle::failed(error, encoding);
    }

    let env = compose_run_env(&config.env, default_tool_dirs());
    let run_id = Uuid::now_v7();
    match build(shell, &config, &env).spawn() {
        Err(source) => TaskHandle::failed(
            TaskError::Launch {
                interpreter: shell.program.to_string(),
                source,
            },
            encoding,
        ),
        Ok(child) => {
            let pid = child.id();
            debug!(
                run_id = %run_id,
                shell = shell.program,
                pid = ?pid,
                task = %config.task,
                cwd = ?config.cwd,
                "streaming run launched"
            );
            let outcome = tokio::spawn(drive(child, config, run_id));
            TaskHandle::new(pid, encoding, outcome)
        }
    }
}

/// The completion join: stdout drained, stderr drained, stdin fed to
/// end-of-stream, child exited. All four before the outcome exists.
async fn drive(mut child: Child, config: TaskConfig, run_id: Uuid) -> TaskOutcome {
    let TaskConfig {
        stdout,
        stderr,
        stdin,
        encoding,
        ..
    } = config;

    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();
    let stdin_pipe = child.stdin.take();

    let (stdout_res, stderr_res, feed_res, wait_res) = tokio::join!(
        collect_channel(stdout_pipe, stdout.into_sink()),
        collect_channel(stderr_pipe, stderr.into_sink()),
        feed_stdin(stdin_pipe, stdin.into_reader()),
        child.wait(),
    );

    let exit_error = match wait_res {
        Ok(status) => status_error(status),
        Err(source) => {
            warn!(run_id = %run_id, error = %source, "waiting for child failed");
            Some(TaskError::Wait { source })
        }
    };
    let (stdout_bytes, stdout_error) = settle(stdout_res, StreamChannel::Stdout);
    let (stderr_bytes, stderr_error) = settle(stderr_res, StreamChannel::Stderr);
    let feed_error = feed_res.err().map(|source| {
        warn!(error = %source, "stdin feed failed");
        TaskError::Stream {
            channel: StreamChannel::Stdin,
            source,
        }
    });

    // exit status first; collected output survives either way
    let error = exit_error.or(stdout_error).or(stderr_error).or(feed_error);
    let outcome = TaskOutcome {
        error,
        stdout: Captured::from_bytes(stdout_bytes, encoding),
        stderr: Captured::from_bytes(stderr_bytes, encoding),
    };
    debug!(run_id = %run_id, code = ?outcome.exit_code(), "streaming run finished");
    outcome
}

/// Inherited channels have no pipe and report empty output.
async fn collect_channel<R>(pipe: Option<R>, sink: Option<Sink>) -> Pumped
where
    R: AsyncRead + Unpin,
{
    match pipe {
        Some(reader) => pump(reader, sink).await,
        None => Pumped::default(),
    }
}

/// Unpack one channel: the bytes always survive, and only the read side
/// can fail the run. A broken tee sink is logged and forgotten.
fn settle(pumped: Pumped, channel: StreamChannel) -> (Vec<u8>, Option<TaskError>) {
    if let Some(error) = pumped.sink_error {
        warn!(channel = %channel, error = %error, "tee sink failed, mirroring stopped");
    }
    let error = pumped.read_error.map(|source| {
        warn!(channel = %channel, error = %source, "stream pump failed");
        TaskError::Stream { channel, source }
    });
    (pumped.bytes, error)
}
