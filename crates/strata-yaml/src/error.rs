//! Error types for YAML tokenization.

use crate::SourceInfo;
use thiserror::Error;

/// Result type alias for strata-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while tokenizing a document.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// The underlying YAML grammar is malformed.
    #[error("parse error: {message}")]
    Parse {
        message: String,
        location: Option<SourceInfo>,
    },
}

impl From<yaml_rust2::ScanError> for Error {
    fn from(err: yaml_rust2::ScanError) -> Self {
        Error::Parse {
            message: err.to_string(),
            location: None,
        }
    }
}
