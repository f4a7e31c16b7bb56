//! End-to-end runs through real shells.

#![cfg(unix)]

use taskpipe_runner::{exec, spawn, Captured, Encoding, Feed, Sink, TaskConfig, TaskError, Tee};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[tokio::test]
async fn test_exec_echo_round_trip() {
    let outcome = exec("echo this is a test").join().await;
    assert!(outcome.error.is_none());
    assert_eq!(outcome.stdout.to_text().trim(), "this is a test");
    assert_eq!(outcome.stderr.to_text().trim(), "");
}

#[tokio::test]
async fn test_spawn_echo_round_trip() {
    let outcome = spawn("echo this is a test").join().await;
    assert!(outcome.error.is_none());
    assert_eq!(outcome.stdout.to_text().trim(), "this is a test");
}

#[tokio::test]
async fn test_exec_nonzero_exit_preserves_output() {
    let outcome = exec("echo partial && exit 3").join().await;
    assert_eq!(outcome.exit_code(), Some(3));
    assert!(matches!(outcome.error, Some(TaskError::Exit { code: 3 })));
    assert_eq!(outcome.stdout.to_text().trim(), "partial");
}

#[tokio::test]
async fn test_spawn_nonzero_exit_preserves_output() {
    let outcome = spawn("printf partial; exit 5").join().await;
    assert_eq!(outcome.exit_code(), Some(5));
    assert_eq!(outcome.stdout.to_text(), "partial");
}

#[tokio::test]
async fn test_exec_reports_exit_code_without_output() {
    let outcome = exec("exit 7").join().await;
    assert_eq!(outcome.exit_code(), Some(7));
    assert!(outcome.stdout.is_empty());
    assert!(outcome.stderr.is_empty());
}

#[tokio::test]
async fn test_exec_missing_command_reports_not_found_code() {
    let outcome = exec("taskpipe-definitely-missing-binary").join().await;
    let error = outcome.error.expect("missing command must error");
    assert_eq!(error.exit_code(), Some(127));
    assert!(outcome.stdout.is_empty());
}

#[tokio::test]
async fn test_exec_runs_in_requested_cwd() {
    let dir = tempfile::tempdir().expect("tempdir");
    let expected = std::fs::canonicalize(dir.path()).expect("canonicalize");

    let outcome = exec(TaskConfig::new("pwd").cwd(dir.path())).join().await;
    assert!(outcome.error.is_none());
    assert_eq!(
        std::path::PathBuf::from(outcome.stdout.to_text().trim()),
        expected
    );
}

#[tokio::test]
async fn test_env_override_reaches_child() {
    let config = TaskConfig::new(r#"printf "$TP_RUN_ENV""#).env("TP_RUN_ENV", "from-test");
    let outcome = spawn(config).join().await;
    assert!(outcome.error.is_none());
    assert_eq!(outcome.stdout.to_text(), "from-test");
}

#[tokio::test]
async fn test_child_search_path_gains_tool_dirs() {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.to_string_lossy().into_owned()))
        .expect("test binary location");

    let outcome = spawn(r#"printf "$PATH""#).join().await;
    assert!(outcome.error.is_none());
    let child_path = outcome.stdout.to_text().into_owned();
    assert!(!child_path.is_empty());
    assert!(
        child_path.contains(&exe_dir),
        "child PATH {child_path:?} should contain {exe_dir:?}"
    );
}

#[tokio::test]
async fn test_spawn_preserves_write_order() {
    let outcome = spawn("printf A; printf B").join().await;
    assert!(outcome.error.is_none());
    assert_eq!(outcome.stdout.to_text(), "AB");
}

#[tokio::test]
async fn test_spawn_feeds_static_stdin() {
    let config = TaskConfig::new("cat").stdin(Feed::reader(&b"AB"[..]));
    let outcome = spawn(config).join().await;
    assert!(outcome.error.is_none());
    assert_eq!(outcome.stdout.to_text(), "AB");
}

#[tokio::test]
async fn test_spawn_waits_for_stdin_end_of_stream() {
    let (mut feeder, source) = tokio::io::duplex(16);
    let writer = tokio::spawn(async move {
        feeder.write_all(b"A").await.unwrap();
        feeder.write_all(b"B").await.unwrap();
        // dropping the feeder is the end-of-stream the join waits on
    });

    let outcome = spawn(TaskConfig::new("cat").stdin(Feed::reader(source)))
        .join()
        .await;
    writer.await.unwrap();
    assert!(outcome.error.is_none());
    assert_eq!(outcome.stdout.to_text(), "AB");
}

#[tokio::test]
async fn test_spawn_tee_closes_writer_sink_and_still_collects() {
    let (sink_near, mut sink_far) = tokio::io::duplex(1024);
    let config = TaskConfig::new("printf AB").stdout(Sink::writer(sink_near));
    let outcome = spawn(config).join().await;

    assert!(outcome.error.is_none());
    assert_eq!(outcome.stdout.to_text(), "AB");

    // EOF here proves the non-live sink was shut down after the run
    let mut mirrored = Vec::new();
    sink_far.read_to_end(&mut mirrored).await.unwrap();
    assert_eq!(mirrored, b"AB");
}

#[tokio::test]
async fn test_exec_replays_into_writer_sink_and_closes_it() {
    let (sink_near, mut sink_far) = tokio::io::duplex(1024);
    let config = TaskConfig::new("printf AB").stdout(Sink::writer(sink_near));
    let outcome = exec(config).join().await;

    assert!(outcome.error.is_none());
    assert_eq!(outcome.stdout.to_text(), "AB");

    // the buffered copy lands in the sink after completion, then EOF
    let mut mirrored = Vec::new();
    sink_far.read_to_end(&mut mirrored).await.unwrap();
    assert_eq!(mirrored, b"AB");
}

#[tokio::test]
async fn test_spawn_broken_tee_sink_keeps_collected_output() {
    let (sink_near, sink_far) = tokio::io::duplex(16);
    drop(sink_far);

    let config = TaskConfig::new("printf AB").stdout(Sink::writer(sink_near));
    let outcome = spawn(config).join().await;

    // the tee detaches; collection and the exit status are untouched
    assert!(outcome.error.is_none());
    assert_eq!(outcome.exit_code(), Some(0));
    assert_eq!(outcome.stdout.to_text(), "AB");
}

#[tokio::test]
async fn test_spawn_broken_tee_sink_leaves_child_undisturbed() {
    let (sink_near, sink_far) = tokio::io::duplex(16);
    drop(sink_far);

    let config = TaskConfig::new("printf AB; sleep 0.3; printf CD; exit 0")
        .stdout(Sink::writer(sink_near));
    let outcome = spawn(config).join().await;

    // the child keeps writing long after the sink died
    assert_eq!(outcome.exit_code(), Some(0));
    assert_eq!(outcome.stdout.to_text(), "ABCD");
}

#[tokio::test]
async fn test_spawn_tee_to_host_stdout_keeps_collecting() {
    let config = TaskConfig::new("printf live-tee").stdout(Sink::stdout());
    let outcome = spawn(config).join().await;
    assert!(outcome.error.is_none());
    assert_eq!(outcome.stdout.to_text(), "live-tee");

    // the run's end-of-stream never reaches the host's own stream
    let mut host = tokio::io::stdout();
    host.write_all(b"\n").await.expect("host stdout stays open");
    host.flush().await.expect("host stdout stays open");
}

#[tokio::test]
async fn test_exec_inherit_reports_empty_channel() {
    let outcome = exec(TaskConfig::new("echo shown live").stdout(Tee::Inherit))
        .join()
        .await;
    assert!(outcome.error.is_none());
    assert!(outcome.stdout.is_empty());
}

#[tokio::test]
async fn test_spawn_inherit_reports_empty_channel() {
    let outcome = spawn(TaskConfig::new("echo shown live").stdout(Tee::Inherit))
        .join()
        .await;
    assert!(outcome.error.is_none());
    assert!(outcome.stdout.is_empty());
}

#[tokio::test]
async fn test_raw_encoding_keeps_bytes() {
    let outcome = exec(TaskConfig::new("printf AB").encoding(Encoding::Raw))
        .join()
        .await;
    assert!(outcome.error.is_none());
    assert_eq!(outcome.stdout, Captured::Raw(b"AB".to_vec()));
}

#[tokio::test]
async fn test_spawn_exposes_pid() {
    let handle = spawn("true");
    assert!(handle.pid().is_some());
    let outcome = handle.join().await;
    assert!(outcome.success());
}

#[tokio::test]
async fn test_detached_run_still_feeds_sinks() {
    let (sink_near, mut sink_far) = tokio::io::duplex(1024);
    let handle = spawn(TaskConfig::new("printf done").stdout(Sink::writer(sink_near)));
    handle.detach();

    // the detached run keeps going; the sink sees the data and then EOF
    let mut mirrored = Vec::new();
    sink_far.read_to_end(&mut mirrored).await.unwrap();
    assert_eq!(mirrored, b"done");
}
