//! Ignore-pattern compilation (component D) and the ignore-set evaluator
//! (component E): turning the lines of one ignore file into a compiled,
//! orderable rule list and deciding a verdict for a candidate path.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::glob::Glob;
use crate::pathutil::{remove_prefix, strip_dot_slash, to_slash_string};
use crate::Match;

/// One compiled line from an ignore file.
#[derive(Clone, Debug)]
pub struct IgnorePattern {
    original_text: String,
    glob: Glob,
    negated: bool,
    dir_only: bool,
}

impl PartialEq for IgnorePattern {
    fn eq(&self, other: &IgnorePattern) -> bool {
        self.original_text == other.original_text
    }
}

impl IgnorePattern {
    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn is_dir_only(&self) -> bool {
        self.dir_only
    }
}

/// Compile one line of an ignore file (component D). `case_insensitive`
/// selects the glob's matching mode; the line's own absolute/negated/
/// dir-only flags are extracted here.
///
/// Returns `None` for comments and blank lines.
pub fn compile_line(
    line: &str,
    case_insensitive: bool,
) -> Result<Option<IgnorePattern>, Error> {
    if line.starts_with('#') {
        return Ok(None);
    }
    let trimmed = if line.ends_with("\\ ") { line } else { line.trim_end() };
    if trimmed.is_empty() {
        return Ok(None);
    }

    let mut body = trimmed;
    let mut negated = false;
    let mut absolute = false;

    if body.starts_with("\\!") || body.starts_with("\\#") {
        // Only the backslash is dropped — the `!`/`#` itself survives as a
        // literal leading character, not a negation/comment marker.
        body = &body[1..];
        absolute = body[1..].starts_with('/');
    } else {
        if let Some(rest) = body.strip_prefix('!') {
            negated = true;
            body = rest;
        }
        if let Some(rest) = body.strip_prefix('/') {
            absolute = true;
            body = rest;
        }
    }

    let mut dir_only = false;
    if let Some(rest) = body.strip_suffix('/') {
        dir_only = true;
        body = rest.strip_suffix('\\').unwrap_or(rest);
    }

    let mut pattern = body.to_string();
    if !absolute && !pattern.contains('/') && !pattern.starts_with("**/") && pattern != "**" {
        pattern = format!("**/{pattern}");
    }
    if pattern.ends_with("/**") {
        pattern.push_str("/*");
    }

    let glob = Glob::new(&pattern, case_insensitive).map_err(Error::Glob)?;
    Ok(Some(IgnorePattern {
        original_text: trimmed.to_string(),
        glob,
        negated,
        dir_only,
    }))
}

/// An ordered collection of ignore patterns rooted at a directory
/// (component E). Patterns are stored in *reverse* of file order so a
/// linear scan's first hit is the last matching line, i.e. "last line
/// wins".
#[derive(Clone, Debug, Default)]
pub struct IgnoreSet {
    root: PathBuf,
    patterns: Vec<IgnorePattern>,
}

impl IgnoreSet {
    /// An ignore set with no patterns; always yields `Match::None`.
    pub fn empty() -> IgnoreSet {
        IgnoreSet { root: PathBuf::new(), patterns: Vec::new() }
    }

    pub fn from_patterns(root: impl Into<PathBuf>, mut patterns: Vec<IgnorePattern>) -> IgnoreSet {
        patterns.reverse();
        IgnoreSet { root: root.into(), patterns }
    }

    /// Parse `path` line by line as an ignore file rooted at `path`'s
    /// parent directory. Missing files are *not* an error at this layer;
    /// callers decide whether an absent optional ignore file should be
    /// treated as empty.
    pub fn from_file(path: &Path, case_insensitive: bool) -> Result<IgnoreSet, Error> {
        let root = path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
        let contents = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        let mut patterns = Vec::new();
        for (i, line) in contents.lines().enumerate() {
            let lineno = (i + 1) as u64;
            if let Some(pat) =
                compile_line(line, case_insensitive).map_err(|err| err.tagged(path, lineno))?
            {
                patterns.push(pat);
            }
        }
        Ok(IgnoreSet::from_patterns(root, patterns))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Decide the verdict for `path` (component E's core operation).
    /// `is_dir` must be true when `path` names a directory.
    pub fn matched(&self, path: &Path, is_dir: bool) -> Match<&IgnorePattern> {
        if self.patterns.is_empty() {
            return Match::None;
        }
        let candidate = to_slash_string(path);
        let candidate = strip_dot_slash(&candidate);
        let root = to_slash_string(&self.root);
        let root = strip_dot_slash(&root);
        let prepared = remove_prefix(root, candidate);

        for pat in &self.patterns {
            if pat.dir_only && !is_dir {
                continue;
            }
            if pat.glob.is_match(prepared) {
                return if pat.negated {
                    Match::Allow(pat)
                } else {
                    Match::Ignore(pat)
                };
            }
        }
        Match::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_from(lines: &[&str]) -> IgnoreSet {
        let mut patterns = Vec::new();
        for line in lines {
            if let Some(p) = compile_line(line, false).unwrap() {
                patterns.push(p);
            }
        }
        IgnoreSet::from_patterns("", patterns)
    }

    #[test]
    fn last_line_wins() {
        let set = set_from(&["*.txt", "!file2b.txt"]);
        assert!(set.matched(Path::new("file2a.txt"), false).is_ignore());
        assert!(set.matched(Path::new("file2b.txt"), false).is_allow());
    }

    #[test]
    fn dir_only_respects_is_dir() {
        let set = set_from(&["foo/"]);
        assert!(set.matched(Path::new("foo"), true).is_ignore());
        assert!(set.matched(Path::new("foo"), false).is_none());
    }

    #[test]
    fn recursive_directory_contents_excluded_not_self() {
        let set = set_from(&["**/dir2a/**"]);
        assert!(set.matched(Path::new("dir2a"), true).is_none());
        assert!(set.matched(Path::new("dir2a/file"), false).is_ignore());
        assert!(set.matched(Path::new("a/dir2a/file"), false).is_ignore());
    }

    #[test]
    fn bareword_pattern_matches_anywhere() {
        let set = set_from(&["foo"]);
        assert!(set.matched(Path::new("foo"), false).is_ignore());
        assert!(set.matched(Path::new("a/foo"), false).is_ignore());
    }

    #[test]
    fn slash_pattern_is_rooted() {
        let set = set_from(&["/foo"]);
        assert!(set.matched(Path::new("foo"), false).is_ignore());
        assert!(set.matched(Path::new("a/foo"), false).is_none());
    }

    #[test]
    fn comment_and_blank_lines_are_skipped() {
        assert!(compile_line("# comment", false).unwrap().is_none());
        assert!(compile_line("", false).unwrap().is_none());
        assert!(compile_line("   ", false).unwrap().is_none());
    }

    #[test]
    fn escaped_leading_bang_is_literal() {
        let set = set_from(&[r"\!xy"]);
        assert!(set.matched(Path::new("!xy"), false).is_ignore());
    }

    #[test]
    fn root_prefix_is_stripped_before_matching() {
        let mut patterns = Vec::new();
        if let Some(p) = compile_line("foo", false).unwrap() {
            patterns.push(p);
        }
        let set = IgnoreSet::from_patterns("root", patterns);
        assert!(set.matched(Path::new("root/foo"), false).is_ignore());
    }

    #[test]
    fn empty_set_short_circuits() {
        let set = IgnoreSet::empty();
        assert!(set.matched(Path::new("anything"), false).is_none());
    }
}
