//! Handler contract (component I) and the collecting reference handler
//! (component J).

use std::path::{Path, PathBuf};

/// The subset of filesystem attributes the walker resolves once per entry
/// and hands to the handler alongside the path, so a handler never needs
/// to re-stat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Attrs {
    pub is_dir: bool,
    pub is_hidden: bool,
    pub is_symlink: bool,
}

/// A boxed handler failure. Propagates through [`crate::Error::Handler`]
/// unchanged to the walk's caller.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Callback interface invoked once per directory and once per file
/// visited. Returning `Ok(false)` requests termination of the walk;
/// returning `Err` propagates as a fatal condition.
pub trait Handler {
    fn file(&mut self, path: &Path, attrs: &Attrs) -> Result<bool, HandlerError>;

    /// Defaults to continuing the walk unconditionally.
    fn directory(&mut self, path: &Path, attrs: &Attrs) -> Result<bool, HandlerError> {
        let _ = (path, attrs);
        Ok(true)
    }
}

/// Reference handler (component J): accumulates every visited path in
/// traversal order, tagged with whether it was a file or a directory.
#[derive(Debug, Default)]
pub struct CollectingHandler {
    files: Vec<PathBuf>,
    directories: Vec<PathBuf>,
}

impl CollectingHandler {
    pub fn new() -> CollectingHandler {
        CollectingHandler::default()
    }

    /// Every visited path, files first in visit order then directories,
    /// matching the order this reference handler records them.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().chain(self.directories.iter()).map(PathBuf::as_path)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }
}

impl Handler for CollectingHandler {
    fn file(&mut self, path: &Path, _attrs: &Attrs) -> Result<bool, HandlerError> {
        self.files.push(path.to_path_buf());
        Ok(true)
    }

    fn directory(&mut self, path: &Path, _attrs: &Attrs) -> Result<bool, HandlerError> {
        self.directories.push(path.to_path_buf());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_files_and_directories() {
        let mut h = CollectingHandler::new();
        h.directory(Path::new("root"), &Attrs { is_dir: true, ..Default::default() }).unwrap();
        h.file(Path::new("root/a.txt"), &Attrs::default()).unwrap();
        assert_eq!(h.files(), &[PathBuf::from("root/a.txt")]);
        assert_eq!(h.directories(), &[PathBuf::from("root")]);
    }

    #[test]
    fn default_directory_callback_continues() {
        struct FileOnly(Vec<PathBuf>);
        impl Handler for FileOnly {
            fn file(&mut self, path: &Path, _attrs: &Attrs) -> Result<bool, HandlerError> {
                self.0.push(path.to_path_buf());
                Ok(true)
            }
        }
        let mut h = FileOnly(Vec::new());
        assert!(h.directory(Path::new("x"), &Attrs::default()).unwrap());
    }
}
