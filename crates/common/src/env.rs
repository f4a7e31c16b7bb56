//! Environment composition for child processes.
//!
//! Two entry points share one overlay policy: [`compose_env`] merges
//! caller overrides onto a copy of the inherited environment, and
//! [`compose_run_env`] additionally composes the executable search path
//! from the caller's fragment, the inherited value, and the injected
//! [`ToolDirs`] entries. Neither touches the process environment and the
//! returned map never aliases the caller's collections.

use crate::paths::{merge_search_path, ToolDirs, PATH_CASINGS, PATH_VAR};
use std::collections::HashMap;
use std::env;

/// Copy of the inherited environment, lossily coerced to text so that
/// non-UTF-8 values cannot abort composition.
fn inherited() -> HashMap<String, String> {
    env::vars_os()
        .map(|(key, value)| {
            (
                key.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        })
        .collect()
}

/// Search-path value of a mapping, honoring every casing variant.
fn search_path_fragment(map: &HashMap<String, String>) -> Option<&str> {
    PATH_CASINGS
        .iter()
        .find_map(|name| map.get(*name))
        .map(String::as_str)
}

/// Overlay `overrides` onto a copy of the inherited environment.
///
/// Caller values win on key collision and are stringified. The process
/// environment is left unmodified; mutating the result has no effect on
/// later calls.
pub fn compose_env<K, V, I>(overrides: I) -> HashMap<String, String>
where
    K: Into<String>,
    V: ToString,
    I: IntoIterator<Item = (K, V)>,
{
    let mut composed = inherited();
    for (key, value) in overrides {
        composed.insert(key.into(), value.to_string());
    }
    composed
}

/// Full per-launch composition: overlay plus search-path injection.
///
/// The composed search path concatenates, in priority order, the caller's
/// fragment (any casing), the inherited value, and the `dirs` entries,
/// with trailing separators trimmed and duplicates kept. Every casing
/// variant is then dropped so the result carries exactly one `PATH`.
pub fn compose_run_env(
    overrides: &HashMap<String, String>,
    dirs: &ToolDirs,
) -> HashMap<String, String> {
    let inherited = inherited();

    let mut fragments: Vec<String> = Vec::new();
    fragments.extend(search_path_fragment(overrides).map(str::to_owned));
    fragments.extend(search_path_fragment(&inherited).map(str::to_owned));
    fragments.extend(dirs.fragments());
    let search_path = merge_search_path(&fragments);

    let mut composed = inherited;
    for (key, value) in overrides {
        composed.insert(key.clone(), value.clone());
    }
    for name in PATH_CASINGS {
        composed.remove(name);
    }
    composed.insert(PATH_VAR.to_string(), search_path);
    composed
}
