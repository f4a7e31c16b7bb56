//! Interpreter selection and child-command assembly.

use crate::config::TaskConfig;
use crate::error::TaskError;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use tokio::process::Command;

/// Interpreter used to run one task line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Interpreter {
    pub(crate) program: &'static str,
    pub(crate) flag: &'static str,
}

/// Platform default interpreter, used by the buffered executor.
pub(crate) fn default_interpreter() -> Interpreter {
    if cfg!(windows) {
        Interpreter {
            program: "cmd.exe",
            flag: "/c",
        }
    } else {
        Interpreter {
            program: "/bin/sh",
            flag: "-c",
        }
    }
}

/// Explicit shell used by the streaming executor.
pub(crate) fn explicit_shell() -> Interpreter {
    if cfg!(windows) {
        Interpreter {
            program: "cmd.exe",
            flag: "/c",
        }
    } else {
        Interpreter {
            program: "bash",
            flag: "-c",
        }
    }
}

/// A missing interpreter surfaces as a launch failure before any spawn.
pub(crate) fn ensure_interpreter(interpreter: Interpreter) -> Result<(), TaskError> {
    if which::which(interpreter.program).is_ok() || Path::new(interpreter.program).exists() {
        return Ok(());
    }
    Err(TaskError::Launch {
        interpreter: interpreter.program.to_string(),
        source: io::Error::new(io::ErrorKind::NotFound, "interpreter not found on PATH"),
    })
}

/// Assemble the child command: argv, cwd, composed environment, stdio.
pub(crate) fn build(
    interpreter: Interpreter,
    config: &TaskConfig,
    env: &HashMap<String, String>,
) -> Command {
    let mut command = Command::new(interpreter.program);

    #[cfg(windows)]
    {
        command.arg(interpreter.flag);
        if config.windows_verbatim_arguments {
            command.raw_arg(&config.task);
        } else {
            command.arg(&config.task);
        }
    }
    #[cfg(not(windows))]
    {
        command.arg(interpreter.flag).arg(&config.task);
    }

    if let Some(cwd) = &config.cwd {
        command.current_dir(cwd);
    }
    command.env_clear().envs(env);
    command.stdin(config.stdin.stdio());
    command.stdout(config.stdout.stdio());
    command.stderr(config.stderr.stdio());
    command
}
