//! Search-path fragments and the per-process injected tool directories.

use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;

/// Canonical name of the executable-search-path variable.
pub const PATH_VAR: &str = "PATH";

/// Casing variants reconciled during composition. Lookups honor any of
/// them; only [`PATH_VAR`] survives in a composed environment.
pub const PATH_CASINGS: [&str; 3] = ["PATH", "Path", "path"];

/// Platform separator between search-path entries.
pub fn path_separator() -> char {
    if cfg!(windows) {
        ';'
    } else {
        ':'
    }
}

/// Executable directories injected into every composed search path,
/// resolved once per process from the running binary's location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolDirs {
    /// Directory containing the running executable.
    pub exe_dir: Option<PathBuf>,
    /// Parent of that directory, so sibling tool trees resolve too.
    pub parent_dir: Option<PathBuf>,
}

impl ToolDirs {
    /// Derive both entries from `current_exe`. Either entry is absent when
    /// the corresponding directory cannot be determined.
    pub fn from_current_exe() -> Self {
        let exe_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(PathBuf::from));
        let parent_dir = exe_dir
            .as_ref()
            .and_then(|dir| dir.parent().map(PathBuf::from));
        Self {
            exe_dir,
            parent_dir,
        }
    }

    /// No injected entries. Keeps composed paths stable in tests.
    pub fn none() -> Self {
        Self::default()
    }

    pub(crate) fn fragments(&self) -> impl Iterator<Item = String> + '_ {
        [&self.exe_dir, &self.parent_dir]
            .into_iter()
            .flatten()
            .map(|dir| dir.to_string_lossy().into_owned())
    }
}

static DEFAULT_TOOL_DIRS: Lazy<ToolDirs> = Lazy::new(ToolDirs::from_current_exe);

/// Per-process default tool directories.
pub fn default_tool_dirs() -> &'static ToolDirs {
    &DEFAULT_TOOL_DIRS
}

/// Concatenate search-path fragments in priority order.
///
/// Each fragment is trimmed of surrounding whitespace and trailing
/// separators before joining; empty fragments are skipped. A fragment may
/// itself hold several entries. Duplicate entries are kept.
pub fn merge_search_path<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let separator = path_separator();
    let mut parts: Vec<String> = Vec::new();
    for fragment in fragments {
        let trimmed = fragment.as_ref().trim().trim_end_matches(separator);
        if trimmed.is_empty() {
            continue;
        }
        parts.push(trimmed.to_string());
    }
    parts.join(&separator.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sep() -> String {
        path_separator().to_string()
    }

    #[test]
    fn test_merge_trims_trailing_separators() {
        let sep = sep();
        let merged = merge_search_path([format!("/alpha{sep}"), " /beta ".to_string()]);
        assert_eq!(merged, format!("/alpha{sep}/beta"));
    }

    #[test]
    fn test_merge_skips_empty_fragments() {
        let sep = sep();
        let merged = merge_search_path(["/alpha", "", "   ", "/beta"]);
        assert_eq!(merged, format!("/alpha{sep}/beta"));
    }

    #[test]
    fn test_merge_keeps_duplicates() {
        let sep = sep();
        let merged = merge_search_path(["/same", "/same"]);
        assert_eq!(merged, format!("/same{sep}/same"));
    }

    #[test]
    fn test_merge_keeps_multi_entry_fragments_intact() {
        let sep = sep();
        let inherited = format!("/usr/bin{sep}/bin");
        let merged = merge_search_path(["/caller", inherited.as_str()]);
        assert_eq!(merged, format!("/caller{sep}{inherited}"));
    }

    #[test]
    fn test_tool_dirs_from_current_exe() {
        let dirs = ToolDirs::from_current_exe();
        assert!(dirs.exe_dir.is_some());
        assert!(dirs.parent_dir.is_some());
    }

    #[test]
    fn test_tool_dirs_none_has_no_fragments() {
        assert_eq!(ToolDirs::none().fragments().count(), 0);
    }
}
