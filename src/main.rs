//! taskpipe command-line front end.
//!
//! By default the child shares this process's terminal and taskpipe exits
//! with the child's code. `--buffered` holds output back until the run
//! finishes; `--json` captures output and prints one machine-readable
//! record instead of mirroring anything.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use clap::Parser;
use serde_json::json;
use taskpipe_common::log_schema;
use taskpipe_runner::{exec, spawn, Feed, Sink, TaskConfig, TaskError, TaskOutcome, Tee};

#[derive(Parser, Debug)]
#[command(name = "taskpipe")]
#[command(version, about = "Run a shell command with buffered or streaming output", long_about = None)]
struct Cli {
    /// Command line to hand to the platform shell
    #[arg(
        short = 'c',
        long = "command",
        value_name = "CMD",
        conflicts_with = "argv"
    )]
    command: Option<String>,

    /// Hold output back and emit it once the run finishes
    #[arg(long = "buffered")]
    buffered: bool,

    /// Working directory for the child process
    #[arg(long = "cwd", value_name = "DIR")]
    cwd: Option<PathBuf>,

    /// Extra environment for the child as KEY=VALUE (repeatable)
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE")]
    env: Vec<String>,

    /// Capture output and print one JSON record instead of mirroring it
    #[arg(long = "json")]
    json: bool,

    /// Command line as trailing arguments
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    argv: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    match run().await {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("taskpipe: {e:?}");
            ExitCode::from(126)
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let task = task_line(&cli)?;
    let env = parse_env(&cli.env)?;
    log::debug!("task line: {task:?}");

    let mut config = TaskConfig::new(task).envs(env);
    if let Some(cwd) = cli.cwd.clone() {
        config = config.cwd(cwd);
    }

    if cli.json {
        return Ok(run_json(&cli, config).await);
    }

    config = if cli.buffered {
        // captured during the run, replayed onto the terminal at the end
        config.stdout(Sink::stdout()).stderr(Sink::stderr())
    } else {
        config
            .stdout(Tee::Inherit)
            .stderr(Tee::Inherit)
            .stdin(Feed::Inherit)
    };

    let handle = if cli.buffered { exec(config) } else { spawn(config) };
    Ok(finish(handle.join().await))
}

async fn run_json(cli: &Cli, config: TaskConfig) -> i32 {
    let task = config.task.clone();
    let started = Instant::now();

    let handle = if cli.buffered { exec(config) } else { spawn(config) };
    let outcome = handle.join().await;
    let duration_ms = started.elapsed().as_millis() as u64;

    let code = outcome.exit_code().unwrap_or(126);
    let mut record = json!({
        log_schema::TIMESTAMP: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        log_schema::TASK: task,
        log_schema::EXIT_CODE: code,
        log_schema::DURATION_MS: duration_ms,
        log_schema::STDOUT: outcome.stdout.to_text(),
        log_schema::STDERR: outcome.stderr.to_text(),
    });
    if let Some(err) = &outcome.error {
        record["error"] = json!(err.to_string());
    }

    println!("{record}");
    code
}

/// Map a finished run to the process exit code, reporting anything that
/// went wrong beyond a plain nonzero exit.
fn finish(outcome: TaskOutcome) -> i32 {
    match outcome.error {
        None => 0,
        Some(TaskError::Exit { code }) => code,
        Some(err) => {
            eprintln!("taskpipe: {err}");
            err.exit_code().unwrap_or(126)
        }
    }
}

fn task_line(cli: &Cli) -> Result<String> {
    if let Some(command) = &cli.command {
        return Ok(command.clone());
    }
    match cli.argv.len() {
        0 => bail!("no command given; pass -c <CMD> or trailing arguments"),
        // a single argument may already be a full shell line
        1 => Ok(cli.argv[0].clone()),
        _ => Ok(shell_words::join(&cli.argv)),
    }
}

fn parse_env(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut env = HashMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("invalid --env entry {pair:?}; expected KEY=VALUE"))?;
        env.insert(key.to_string(), value.to_string());
    }
    Ok(env)
}
