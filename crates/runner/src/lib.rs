//! Cross-platform command execution with buffered and streaming modes.
//!
//! [`exec`] runs a task line through the platform's default interpreter
//! and buffers everything until the child terminates. [`spawn`] runs it
//! through an explicit shell, collects output incrementally, optionally
//! mirrors chunks into caller-supplied [`Sink`]s, and feeds piped stdin.
//! Both deliver one aggregated [`TaskOutcome`] through the returned
//! [`TaskHandle`]; process-level failures travel inside the outcome, not
//! as panics or early returns.
//!
//! ```rust,no_run
//! use taskpipe_runner::{spawn, Sink, TaskConfig};
//!
//! # async fn demo() {
//! let config = TaskConfig::new("echo this is a test").stdout(Sink::stdout());
//! let outcome = spawn(config).join().await;
//! assert!(outcome.success());
//! assert_eq!(outcome.stdout.to_text().trim(), "this is a test");
//! # }
//! ```

mod command;
pub mod config;
pub mod error;
pub mod exec;
pub mod spawn;
pub mod stdio;
pub mod task;

pub use config::{Encoding, TaskConfig};
pub use error::{StreamChannel, TaskError};
pub use exec::exec;
pub use spawn::spawn;
pub use stdio::{Captured, Feed, Sink, Tee};
pub use task::{TaskHandle, TaskOutcome};
