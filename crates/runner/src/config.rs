//! Invocation configuration and its normalization.

use crate::stdio::{Feed, Tee};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// How captured output is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Decode captured bytes to text, replacing invalid sequences.
    #[default]
    Text,
    /// Keep captured bytes untouched.
    Raw,
}

/// Canonical descriptor for one run.
///
/// Built from a bare command string or assembled field by field; every
/// field except `task` has a working default, so `"echo hi".into()` is a
/// complete configuration. A configuration is consumed by the launch and
/// never shared between runs.
#[derive(Debug)]
pub struct TaskConfig {
    /// Shell command line to execute. Must be non-empty.
    pub task: String,
    /// Working directory; the caller's current directory when unset.
    pub cwd: Option<PathBuf>,
    /// Environment overrides, merged over the inherited environment.
    pub env: HashMap<String, String>,
    /// Shape of the captured output.
    pub encoding: Encoding,
    /// Tee for the child's stdout.
    pub stdout: Tee,
    /// Tee for the child's stderr.
    pub stderr: Tee,
    /// Feed for the child's stdin.
    pub stdin: Feed,
    /// Pass the task text to `cmd.exe` verbatim. Ignored elsewhere.
    pub windows_verbatim_arguments: bool,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            task: String::new(),
            cwd: None,
            env: HashMap::new(),
            encoding: Encoding::default(),
            stdout: Tee::None,
            stderr: Tee::None,
            stdin: Feed::None,
            windows_verbatim_arguments: true,
        }
    }
}

impl TaskConfig {
    /// Start a configuration from the command line to run.
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            ..Self::default()
        }
    }

    /// Working directory for the child.
    #[must_use]
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Add one environment override.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.env.insert(key.into(), value.to_string());
        self
    }

    /// Add several environment overrides.
    #[must_use]
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        for (key, value) in vars {
            self.env.insert(key.into(), value.to_string());
        }
        self
    }

    /// Shape of the captured output.
    #[must_use]
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Tee for the child's stdout.
    #[must_use]
    pub fn stdout(mut self, tee: impl Into<Tee>) -> Self {
        self.stdout = tee.into();
        self
    }

    /// Tee for the child's stderr.
    #[must_use]
    pub fn stderr(mut self, tee: impl Into<Tee>) -> Self {
        self.stderr = tee.into();
        self
    }

    /// Feed for the child's stdin.
    #[must_use]
    pub fn stdin(mut self, feed: Feed) -> Self {
        self.stdin = feed;
        self
    }

    /// Argument quoting override for `cmd.exe`.
    #[must_use]
    pub fn windows_verbatim_arguments(mut self, verbatim: bool) -> Self {
        self.windows_verbatim_arguments = verbatim;
        self
    }

    /// Fill launch-time defaults. The result is frozen for one run.
    pub(crate) fn normalized(mut self) -> Self {
        if self.cwd.is_none() {
            self.cwd = env::current_dir().ok();
        }
        self
    }
}

impl From<&str> for TaskConfig {
    fn from(task: &str) -> Self {
        Self::new(task)
    }
}

impl From<String> for TaskConfig {
    fn from(task: String) -> Self {
        Self::new(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdio::Sink;

    #[test]
    fn test_bare_string_fills_defaults() {
        let config = TaskConfig::from("echo hi");
        assert_eq!(config.task, "echo hi");
        assert_eq!(config.encoding, Encoding::Text);
        assert!(config.cwd.is_none());
        assert!(config.env.is_empty());
        assert!(config.windows_verbatim_arguments);
        assert!(matches!(config.stdout, Tee::None));
        assert!(matches!(config.stdin, Feed::None));
    }

    #[test]
    fn test_normalized_pins_current_dir() {
        let config = TaskConfig::from("pwd").normalized();
        assert_eq!(config.cwd, env::current_dir().ok());
    }

    #[test]
    fn test_normalized_keeps_explicit_cwd() {
        let config = TaskConfig::new("pwd").cwd("/somewhere").normalized();
        assert_eq!(config.cwd, Some(PathBuf::from("/somewhere")));
    }

    #[test]
    fn test_builder_chains() {
        let config = TaskConfig::new("cat")
            .env("ONE", 1)
            .envs([("TWO", "2")])
            .encoding(Encoding::Raw)
            .stdout(Sink::stdout())
            .windows_verbatim_arguments(false);
        assert_eq!(config.env.get("ONE").map(String::as_str), Some("1"));
        assert_eq!(config.env.get("TWO").map(String::as_str), Some("2"));
        assert_eq!(config.encoding, Encoding::Raw);
        assert!(matches!(config.stdout, Tee::Sink(_)));
        assert!(!config.windows_verbatim_arguments);
    }
}
