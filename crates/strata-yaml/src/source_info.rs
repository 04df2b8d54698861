//! Source location information for token-tree nodes.

use serde::{Deserialize, Serialize};

/// Position of a YAML element in its original source text.
///
/// Line and column are 1-based; the byte offset is 0-based. Provenance
/// records downstream hold on to these so a resolved value can always be
/// traced back to the exact place it was declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Filename or other source identifier, when known.
    pub file: Option<String>,

    /// Byte offset from the start of the source (0-based).
    pub offset: usize,

    /// Line number (1-based).
    pub line: usize,

    /// Column number (1-based).
    pub col: usize,
}

impl SourceInfo {
    pub fn new(file: Option<String>, offset: usize, line: usize, col: usize) -> Self {
        Self {
            file,
            offset,
            line,
            col,
        }
    }

    /// Convert a yaml-rust2 marker into a SourceInfo. Marker lines are
    /// already 1-based; only the column is 0-based.
    pub fn from_marker(marker: &yaml_rust2::scanner::Marker) -> Self {
        Self {
            file: None,
            offset: marker.index(),
            line: marker.line(),
            col: marker.col() + 1,
        }
    }

    /// Set the filename for this source location.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl Default for SourceInfo {
    fn default() -> Self {
        Self {
            file: None,
            offset: 0,
            line: 1,
            col: 1,
        }
    }
}
