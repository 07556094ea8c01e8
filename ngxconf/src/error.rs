//! Error types for ngxconf.

use ngxconf_syntax::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for ngxconf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ngxconf.
///
/// Loading aborts on the first error; no partially built [`Config`]
/// is ever handed back. An empty find result is a normal outcome and
/// never reported through this type.
///
/// [`Config`]: crate::Config
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed configuration text, fatal to loading that file.
    #[error("syntax error in {}: {source}", path.display())]
    Syntax { path: PathBuf, source: ParseError },

    /// The root config file, or an include target outside quiet mode,
    /// is absent.
    #[error("could not find config file '{}'", .0.display())]
    MissingFile(PathBuf),

    /// An include entry unexpectedly lacks a directive payload.
    #[error("include entry '{0}' is not a directive")]
    InvalidDirective(String),

    /// Malformed include pattern encountered at load time.
    #[error("invalid include pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
