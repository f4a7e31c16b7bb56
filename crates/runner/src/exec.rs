//! Buffered executor: one-shot interpreter run with full buffering.

use crate::command::{build, default_interpreter, ensure_interpreter};
use crate::config::TaskConfig;
use crate::error::{status_error, TaskError};
use crate::stdio::{feed_stdin, replay, Captured};
use crate::task::{TaskHandle, TaskOutcome};
use taskpipe_common::{compose_run_env, default_tool_dirs};
use tokio::process::Child;
use tracing::{debug, warn};
use uuid::Uuid;

/// Run a task through the platform's default interpreter, buffering all
/// output until the child terminates.
///
/// The returned handle resolves once with the full buffers; there is no
/// incremental access to partial output. Must be called within a Tokio
/// runtime.
pub fn exec(command: impl Into<TaskConfig>) -> TaskHandle {
    let config = command.into().normalized();
    let encoding = config.encoding;
    if config.task.is_empty() {
        return TaskHandle::failed(TaskError::EmptyTask, encoding);
    }

    let interpreter = default_interpreter();
    if let Err(error) = ensure_interpreter(interpreter) {
        return TaskHandle::failed(error, encoding);
    }

    let env = compose_run_env(&config.env, default_tool_dirs());
    let run_id = Uuid::now_v7();
    match build(interpreter, &config, &env).spawn() {
        Err(source) => TaskHandle::failed(
            TaskError::Launch {
                interpreter: interpreter.program.to_string(),
                source,
            },
            encoding,
        ),
        Ok(child) => {
            let pid = child.id();
            debug!(
                run_id = %run_id,
                interpreter = interpreter.program,
                pid = ?pid,
                task = %config.task,
                cwd = ?config.cwd,
                "buffered run launched"
            );
            let outcome = tokio::spawn(drive_buffered(child, config, run_id));
            TaskHandle::new(pid, encoding, outcome)
        }
    }
}

async fn drive_buffered(mut child: Child, config: TaskConfig, run_id: Uuid) -> TaskOutcome {
    let TaskConfig {
        stdout,
        stderr,
        stdin,
        encoding,
        ..
    } = config;

    let stdin_pipe = child.stdin.take();
    let feed = stdin.into_reader();
    if feed.is_some() {
        // not a join condition in buffered mode; the interpreter's
        // completion report is authoritative
        tokio::spawn(async move {
            if let Err(error) = feed_stdin(stdin_pipe, feed).await {
                warn!(error = %error, "stdin feed failed");
            }
        });
    }

    let output = match child.wait_with_output().await {
        Ok(output) => output,
        Err(source) => return TaskOutcome::failed(TaskError::Wait { source }, encoding),
    };

    // a broken sink loses its mirror copy; the run itself is unaffected
    if let Some(sink) = stdout.into_sink() {
        if let Err(error) = replay(sink, &output.stdout).await {
            warn!(error = %error, "stdout sink replay failed");
        }
    }
    if let Some(sink) = stderr.into_sink() {
        if let Err(error) = replay(sink, &output.stderr).await {
            warn!(error = %error, "stderr sink replay failed");
        }
    }

    let error = status_error(output.status);
    debug!(run_id = %run_id, code = ?output.status.code(), "buffered run finished");
    TaskOutcome {
        error,
        stdout: Captured::from_bytes(output.stdout, encoding),
        stderr: Captured::from_bytes(output.stderr, encoding),
    }
}
