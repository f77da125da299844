//! Hierarchical walker (component H): depth-first traversal with a stack
//! of ignore-set contexts and include/exclude/hidden/symlink policy.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::gitconfig::{self, GlobalConfig};
use crate::gitignore::{self, IgnoreSet};
use crate::handler::{Attrs, Handler};
use crate::repo;
use crate::{Error, Match};

/// One fluent setter per traversal option, sensible defaults, `build()`
/// producing an immutable [`Walker`].
#[derive(Clone, Debug)]
pub struct WalkBuilder {
    starts: Vec<PathBuf>,
    includes: Vec<String>,
    exclude_hidden: bool,
    respect_ignore_files: bool,
    follow_links: bool,
    max_depth: Option<usize>,
    case_insensitive: Option<bool>,
}

impl WalkBuilder {
    pub fn new(path: impl AsRef<Path>) -> WalkBuilder {
        WalkBuilder {
            starts: vec![path.as_ref().to_path_buf()],
            includes: Vec::new(),
            exclude_hidden: true,
            respect_ignore_files: true,
            follow_links: false,
            max_depth: None,
            case_insensitive: None,
        }
    }

    /// Add another independent start path to the same walk; each gets its
    /// own ancestor scan and base-ignore stack (component H stays
    /// single-root, this is a thin loop at the call site).
    pub fn add(&mut self, path: impl AsRef<Path>) -> &mut WalkBuilder {
        self.starts.push(path.as_ref().to_path_buf());
        self
    }

    pub fn add_include(&mut self, pattern: impl Into<String>) -> &mut WalkBuilder {
        self.includes.push(pattern.into());
        self
    }

    /// `true` (the default) filters hidden entries unless allow-listed.
    pub fn hidden(&mut self, exclude_hidden: bool) -> &mut WalkBuilder {
        self.exclude_hidden = exclude_hidden;
        self
    }

    pub fn respect_ignore_files(&mut self, yes: bool) -> &mut WalkBuilder {
        self.respect_ignore_files = yes;
        self
    }

    pub fn follow_links(&mut self, yes: bool) -> &mut WalkBuilder {
        self.follow_links = yes;
        self
    }

    pub fn max_depth(&mut self, depth: Option<usize>) -> &mut WalkBuilder {
        self.max_depth = depth;
        self
    }

    /// Override `core.ignoreCase` instead of reading it from the global
    /// config at walk time.
    pub fn case_insensitive(&mut self, yes: bool) -> &mut WalkBuilder {
        self.case_insensitive = Some(yes);
        self
    }

    pub fn build(&self) -> Walker {
        Walker {
            starts: self.starts.clone(),
            includes: self.includes.clone(),
            exclude_hidden: self.exclude_hidden,
            respect_ignore_files: self.respect_ignore_files,
            follow_links: self.follow_links,
            max_depth: self.max_depth,
            case_insensitive: self.case_insensitive,
        }
    }
}

/// An immutable, constructed walker. Not safe for concurrent reuse by
/// multiple threads against the same handler; independent `Walker`s with
/// disjoint roots may run concurrently.
#[derive(Clone, Debug)]
pub struct Walker {
    starts: Vec<PathBuf>,
    includes: Vec<String>,
    exclude_hidden: bool,
    respect_ignore_files: bool,
    follow_links: bool,
    max_depth: Option<usize>,
    case_insensitive: Option<bool>,
}

impl Walker {
    /// Run the traversal, invoking `handler` for every directory and file
    /// that survives the precedence chain. Returns as soon as a handler
    /// callback requests termination or a fatal error occurs.
    pub fn walk(&self, handler: &mut dyn Handler) -> Result<(), Error> {
        let global = self.load_global_config()?;
        let case_insensitive = self.case_insensitive.unwrap_or(global.ignore_case);

        for start in &self.starts {
            let include_matcher = self.build_include_matcher(start, case_insensitive)?;
            let (base_ignores, work_tree_seed) =
                self.ancestor_scan(start, case_insensitive, global.excludes_file.as_deref())?;

            let keep_going = self.walk_dir(
                start,
                0,
                &[],
                work_tree_seed,
                include_matcher.as_ref(),
                &base_ignores,
                case_insensitive,
                handler,
            )?;
            if !keep_going {
                return Ok(());
            }
        }
        Ok(())
    }

    fn load_global_config(&self) -> Result<GlobalConfig, Error> {
        match repo::find_global_config_file() {
            Some(path) => gitconfig::load(&path),
            None => Ok(GlobalConfig::default()),
        }
    }

    fn build_include_matcher(
        &self,
        start: &Path,
        case_insensitive: bool,
    ) -> Result<Option<IgnoreSet>, Error> {
        if self.includes.is_empty() {
            return Ok(None);
        }
        let mut patterns = Vec::new();
        for raw in &self.includes {
            if let Some(pat) = gitignore::compile_line(raw, case_insensitive)? {
                patterns.push(pat);
            }
        }
        Ok(Some(IgnoreSet::from_patterns(start, patterns)))
    }

    /// Walk ancestors of `start`, collecting ignore sets nearest-first and
    /// detecting whether `start` is already inside a work tree before its
    /// own directory is even visited.
    fn ancestor_scan(
        &self,
        start: &Path,
        case_insensitive: bool,
        global_excludes: Option<&Path>,
    ) -> Result<(Vec<Rc<IgnoreSet>>, bool), Error> {
        let mut base = Vec::new();
        let mut work_tree = false;

        if self.respect_ignore_files {
            let mut cur = start.parent();
            while let Some(dir) = cur {
                if let Some(local) = repo::local_ignore_file(dir) {
                    base.push(Rc::new(IgnoreSet::from_file(&local, case_insensitive)?));
                }
                if repo::contains_repo_marker(dir) {
                    work_tree = true;
                    if let Some(exclude) = repo::repo_exclude_file(dir) {
                        base.push(Rc::new(IgnoreSet::from_file(&exclude, case_insensitive)?));
                    }
                    break;
                }
                cur = dir.parent();
            }
            if let Some(global_path) = global_excludes {
                if global_path.is_file() {
                    base.push(Rc::new(IgnoreSet::from_file(global_path, case_insensitive)?));
                }
            }
        }
        Ok((base, work_tree))
    }

    #[allow(clippy::too_many_arguments)]
    fn walk_dir(
        &self,
        dir: &Path,
        depth: usize,
        parent_ignores: &[Rc<IgnoreSet>],
        parent_work_tree: bool,
        include_matcher: Option<&IgnoreSet>,
        base_ignores: &[Rc<IgnoreSet>],
        case_insensitive: bool,
        handler: &mut dyn Handler,
    ) -> Result<bool, Error> {
        if let Some(limit) = self.max_depth {
            if depth > limit {
                return Ok(true);
            }
        }

        let mut ignores = parent_ignores.to_vec();
        let mut work_tree = parent_work_tree;
        if self.respect_ignore_files {
            if let Some(local) = repo::local_ignore_file(dir) {
                ignores.push(Rc::new(IgnoreSet::from_file(&local, case_insensitive)?));
            }
            if repo::contains_repo_marker(dir) {
                work_tree = true;
                if let Some(exclude) = repo::repo_exclude_file(dir) {
                    ignores.push(Rc::new(IgnoreSet::from_file(&exclude, case_insensitive)?));
                }
            }
        }

        let (_, is_symlink) = entry_kind(dir, self.follow_links)?;
        let attrs = Attrs { is_dir: true, is_hidden: is_hidden(dir), is_symlink };
        if let Verdict::Skip = decide(
            dir,
            true,
            include_matcher,
            work_tree,
            &ignores,
            base_ignores,
            &attrs,
            self.exclude_hidden,
        ) {
            return Ok(true);
        }

        match handler.directory(dir, &attrs) {
            Ok(true) => {}
            Ok(false) => return Ok(false),
            Err(err) => return Err(Error::Handler(err)),
        }

        let entries = fs::read_dir(dir).map_err(|err| Error::io(dir, err))?;
        for entry in entries {
            let entry = entry.map_err(|err| Error::io(dir, err))?;
            let path = entry.path();
            let (entry_is_dir, entry_is_symlink) = entry_kind(&path, self.follow_links)?;

            if entry_is_dir {
                let keep_going = self.walk_dir(
                    &path,
                    depth + 1,
                    &ignores,
                    work_tree,
                    include_matcher,
                    base_ignores,
                    case_insensitive,
                    handler,
                )?;
                if !keep_going {
                    return Ok(false);
                }
                continue;
            }

            let attrs = Attrs { is_dir: false, is_hidden: is_hidden(&path), is_symlink: entry_is_symlink };
            if let Verdict::Skip = decide(
                &path,
                false,
                include_matcher,
                work_tree,
                &ignores,
                base_ignores,
                &attrs,
                self.exclude_hidden,
            ) {
                continue;
            }

            match handler.file(&path, &attrs) {
                Ok(true) => {}
                Ok(false) => return Ok(false),
                Err(err) => return Err(Error::Handler(err)),
            }
        }

        Ok(true)
    }
}

enum Verdict {
    Keep,
    Skip,
}

/// Shared precedence chain for both the directory and file visit: include
/// matcher first, then (inside a work tree) the context ignore sets
/// nearest-first followed by the ancestor/global base ignores, then the
/// hidden-file policy.
#[allow(clippy::too_many_arguments)]
fn decide(
    path: &Path,
    is_dir: bool,
    include_matcher: Option<&IgnoreSet>,
    work_tree: bool,
    ignores: &[Rc<IgnoreSet>],
    base_ignores: &[Rc<IgnoreSet>],
    attrs: &Attrs,
    exclude_hidden: bool,
) -> Verdict {
    // A directory with a non-matching include verdict is still descended —
    // only files are pruned by the include matcher, else a start directory
    // (whose own prepared path never matches a pattern aimed at a leaf)
    // would be skipped before its children are ever reached.
    if !is_dir {
        if let Some(include_matcher) = include_matcher {
            if !include_matcher.matched(path, is_dir).is_ignore() {
                return Verdict::Skip;
            }
        }
    }

    let mut allowed = false;
    if work_tree {
        for set in ignores.iter().rev().chain(base_ignores.iter()) {
            match set.matched(path, is_dir) {
                Match::Ignore(_) => return Verdict::Skip,
                Match::Allow(_) => allowed = true,
                Match::None => {}
            }
        }
    }

    if attrs.is_hidden && exclude_hidden && !allowed {
        return Verdict::Skip;
    }
    Verdict::Keep
}

/// `(is_dir, is_symlink)` for `path`, resolved through a symlink only when
/// `follow_links` is set — otherwise a symlinked directory is reported as
/// a non-directory so the walker does not descend into it.
fn entry_kind(path: &Path, follow_links: bool) -> Result<(bool, bool), Error> {
    let meta = fs::symlink_metadata(path).map_err(|err| Error::io(path, err))?;
    let is_symlink = meta.file_type().is_symlink();
    let is_dir = if is_symlink {
        follow_links && fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
    } else {
        meta.is_dir()
    };
    Ok((is_dir, is_symlink))
}

/// Per the open question on platform hidden-file detection: a leading `.`
/// in the file name, with no richer platform attribute consulted.
fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}
