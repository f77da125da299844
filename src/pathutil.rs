//! Segment-aware path utilities (component K).

use std::path::{Path, PathBuf};

/// Normalize `path`'s separators to `/` and render it as a `String`,
/// regardless of the host platform's native separator. The ignore-set and
/// walker machinery always compares against this form.
pub fn to_slash_string(path: &Path) -> String {
    let s = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        s.into_owned()
    } else {
        s.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// Strip `prefix` from the front of `path` at a segment boundary. Returns
/// `path` unchanged unless `path` starts with `prefix` at a `/`-aligned
/// boundary *and* the remaining suffix is non-empty.
///
/// `remove_prefix("fo", "foo/bar")` is `"foo/bar"` (no segment boundary);
/// `remove_prefix("foo", "foo/bar")` is `"bar"`.
pub fn remove_prefix<'a>(prefix: &str, path: &'a str) -> &'a str {
    if prefix.is_empty() {
        return path;
    }
    match path.strip_prefix(prefix) {
        Some(rest) if rest.is_empty() => path,
        Some(rest) => match rest.strip_prefix('/') {
            Some(rest) if !rest.is_empty() => rest,
            _ => path,
        },
        None => path,
    }
}

/// Strip a single leading `./` component, if present.
pub fn strip_dot_slash(path: &str) -> &str {
    path.strip_prefix("./").unwrap_or(path)
}

/// Replace a leading `~/` with `$HOME/`. Returns the input unchanged if
/// there's no leading `~/` or no `HOME` in the environment.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            let mut expanded = PathBuf::from(home);
            expanded.push(rest);
            return to_slash_string(&expanded);
        }
    }
    path.to_string()
}
