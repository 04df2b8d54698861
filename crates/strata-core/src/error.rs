//! Error types for class resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for strata-core operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Errors raised while resolving a class or node.
///
/// A failure on a *parent* class is caught by the resolver and attached to
/// that parent's dependency record instead of aborting the enclosing class;
/// only a failure on the requested document itself (or a depth overrun, or
/// an interpolation cycle) surfaces to the caller.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No backing document could be located for the name.
    #[error("{class_id}: no backing document found")]
    NotFound { class_id: String },

    /// The backing document exists but contains no content.
    #[error("{class_id}: document {} is empty", path.display())]
    EmptyDocument { class_id: String, path: PathBuf },

    /// The backing document could not be read.
    #[error("{class_id}: failed to read {}", path.display())]
    Io {
        class_id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing document is not valid YAML.
    #[error("{class_id}: failed to parse {}: {source}", path.display())]
    Parse {
        class_id: String,
        path: PathBuf,
        #[source]
        source: strata_yaml::Error,
    },

    /// A well-known key has the wrong declared type.
    #[error("{class_id}: `{key}` must be a {expected} in {}", path.display())]
    Structure {
        class_id: String,
        path: PathBuf,
        key: String,
        expected: &'static str,
    },

    /// The include chain went past the configured depth limit. Fatal for the
    /// whole top-level request, never attached to a parent record.
    #[error("{class_id}: include depth exceeds the limit of {limit}")]
    DepthExceeded { class_id: String, limit: usize },

    /// Reference expansion kept producing substitutions past the pass cap,
    /// which means a pair of expressions refers back to itself.
    #[error("{class_id}: interpolation did not settle after {passes} passes")]
    InterpolationCycle { class_id: String, passes: usize },
}

impl ResolveError {
    /// The id of the class or node the error is about.
    pub fn class_id(&self) -> &str {
        match self {
            ResolveError::NotFound { class_id }
            | ResolveError::EmptyDocument { class_id, .. }
            | ResolveError::Io { class_id, .. }
            | ResolveError::Parse { class_id, .. }
            | ResolveError::Structure { class_id, .. }
            | ResolveError::DepthExceeded { class_id, .. }
            | ResolveError::InterpolationCycle { class_id, .. } => class_id,
        }
    }
}
