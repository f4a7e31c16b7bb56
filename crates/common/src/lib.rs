//! Shared building blocks for the taskpipe workspace.
//!
//! The executors and the CLI agree on one environment-merge policy; it
//! lives here together with the search-path helpers and the field names
//! of the structured completion record.

pub mod env;
pub mod paths;

pub use env::{compose_env, compose_run_env};
pub use paths::{
    default_tool_dirs, merge_search_path, path_separator, ToolDirs, PATH_CASINGS, PATH_VAR,
};

/// Field names for the structured completion record.
pub mod log_schema {
    pub const TIMESTAMP: &str = "ts";
    pub const TASK: &str = "task";
    pub const EXIT_CODE: &str = "exit_code";
    pub const DURATION_MS: &str = "duration_ms";
    pub const STDOUT: &str = "stdout";
    pub const STDERR: &str = "stderr";
}
