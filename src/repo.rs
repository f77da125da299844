//! Repository probe (component F): locates ignore files, the
//! repository-info exclude file, and the global excludes-file setting.
//! Pure queries against the local filesystem and process environment;
//! nothing here is cached beyond the lifetime of a single call, because
//! the walker itself is responsible for reading these once per
//! construction (see the crate's design notes on global state).

use std::path::{Path, PathBuf};

use crate::pathutil::expand_tilde;

/// True iff `dir/.git` exists and is a directory — the work-tree marker.
pub fn contains_repo_marker(dir: &Path) -> bool {
    dir.join(".git").is_dir()
}

/// `dir/.git/info/exclude`, if it exists and is readable.
pub fn repo_exclude_file(dir: &Path) -> Option<PathBuf> {
    readable_file(dir.join(".git").join("info").join("exclude"))
}

/// `dir/.gitignore`, if it exists and is readable.
pub fn local_ignore_file(dir: &Path) -> Option<PathBuf> {
    readable_file(dir.join(".gitignore"))
}

/// The first readable of `$HOME/.gitconfig`, `$XDG_CONFIG_HOME/git/config`
/// (if `XDG_CONFIG_HOME` is set and non-empty), or `$HOME/.config/git/config`.
pub fn find_global_config_file() -> Option<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    if let Some(ref home) = home {
        if let Some(path) = readable_file(home.join(".gitconfig")) {
            return Some(path);
        }
    }
    let config_home = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(v) if !v.is_empty() => Some(PathBuf::from(v)),
        _ => home.map(|h| h.join(".config")),
    };
    config_home.and_then(|base| readable_file(base.join("git").join("config")))
}

/// Replace a leading `~/` with `$HOME/`; otherwise return `s` unchanged.
pub fn expand_tilde_path(s: &str) -> PathBuf {
    PathBuf::from(expand_tilde(s))
}

fn readable_file(path: PathBuf) -> Option<PathBuf> {
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn marker_detection() {
        let td = tempfile::tempdir().unwrap();
        assert!(!contains_repo_marker(td.path()));
        fs::create_dir(td.path().join(".git")).unwrap();
        assert!(contains_repo_marker(td.path()));
    }

    #[test]
    fn exclude_file_absent_is_none() {
        let td = tempfile::tempdir().unwrap();
        assert!(repo_exclude_file(td.path()).is_none());
    }

    #[test]
    fn exclude_file_present() {
        let td = tempfile::tempdir().unwrap();
        fs::create_dir_all(td.path().join(".git/info")).unwrap();
        fs::write(td.path().join(".git/info/exclude"), "foo\n").unwrap();
        assert!(repo_exclude_file(td.path()).is_some());
    }

    #[test]
    fn local_ignore_file_present() {
        let td = tempfile::tempdir().unwrap();
        fs::write(td.path().join(".gitignore"), "foo\n").unwrap();
        assert_eq!(local_ignore_file(td.path()), Some(td.path().join(".gitignore")));
    }

    #[test]
    fn tilde_expansion() {
        std::env::set_var("HOME", "/home/tester");
        assert_eq!(expand_tilde_path("~/x"), PathBuf::from("/home/tester/x"));
        assert_eq!(expand_tilde_path("/abs/x"), PathBuf::from("/abs/x"));
    }
}
