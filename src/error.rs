//! Error taxonomy for every fallible stage of the crate: glob syntax,
//! regex compilation, config parsing, and I/O.

use std::io;
use std::path::{Path, PathBuf};

/// The single typed condition surfaced at the crate boundary, per the
/// matching-failure contract: a human-readable message with the original
/// cause preserved.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Glob(#[from] GlobError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{path}: {err}", path = path.display())]
    Io { path: PathBuf, #[source] err: io::Error },

    /// An error tagged with the ignore-file path and line number that
    /// produced it.
    #[error("{path}:{line}: {err}", path = path.display())]
    WithLine { path: PathBuf, line: u64, #[source] err: Box<Error> },

    /// A handler callback propagated its own failure.
    #[error("{0}")]
    Handler(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    pub fn io(path: impl AsRef<Path>, err: io::Error) -> Error {
        Error::Io { path: path.as_ref().to_path_buf(), err }
    }

    pub fn tagged(self, path: impl AsRef<Path>, line: u64) -> Error {
        Error::WithLine { path: path.as_ref().to_path_buf(), line, err: Box::new(self) }
    }
}

/// Syntax and compilation errors raised while turning a glob pattern into
/// a matcher (components B and C).
#[derive(thiserror::Error, Debug)]
pub enum GlobError {
    #[error("incomplete escape sequence in glob {glob:?}")]
    IncompleteEscape { glob: String },

    #[error("character class not closed in glob {glob:?}")]
    UnclosedClass { glob: String },

    #[error("invalid character range {lo:?}-{hi:?} in glob {glob:?}")]
    InvalidRange { glob: String, lo: char, hi: char },

    #[error("could not create regular expression for glob {glob:?}: {err}")]
    Regex { glob: String, #[source] err: regex::Error },
}

/// Errors raised while parsing the minimal git-config subset consumed by
/// component G.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("too many include recursions (limit is {limit})")]
    TooManyIncludes { limit: u32 },

    #[error("bad section header")]
    BadGroupHeader,

    #[error("bad entry delimiter")]
    BadEntryDelimiter,

    #[error("bad entry name")]
    BadEntryName,

    #[error("bad section name")]
    BadSectionName,

    #[error("newline in quoted value not allowed")]
    NewlineInQuotes,

    #[error("end of file inside escape sequence")]
    EofInEscape,

    #[error("bad escape sequence")]
    BadEscape,

    #[error("invalid boolean value {0:?}")]
    InvalidBoolean(String),
}
