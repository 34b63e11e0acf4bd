use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::feed::FeedParseError;

/// Run-level error type: anything that stops a file (or the whole run) from
/// being checked, as opposed to a rule violation inside a feed.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error reading file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid XML in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: FeedParseError,
    },

    #[error("File system traversal error: {path} - {reason}")]
    FileSystemTraversal { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ConfigError> for VerifyError {
    fn from(err: ConfigError) -> Self {
        VerifyError::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, VerifyError>;
