//! # strata-yaml
//!
//! YAML tokenization with source location tracking and comment attachment.
//!
//! This crate parses a single YAML document into a [`YamlToken`] tree. Every
//! node carries a [`SourceInfo`] (file, byte offset, line, column) and the
//! contiguous run of `#` comment lines that immediately precede it in the
//! source text. No merge or inheritance semantics live here; the crate is a
//! stateless front end for the resolver.
//!
//! ## Example
//!
//! ```rust
//! let doc = strata_yaml::parse("# the port to bind\nport: 8080").unwrap();
//! let root = doc.root.unwrap();
//! let port = root.get("port").unwrap();
//! assert_eq!(port.comments, vec!["the port to bind".to_string()]);
//! ```

mod comments;
mod error;
mod parser;
mod source_info;
mod token;

pub use error::{Error, Result};
pub use parser::{parse, parse_file};
pub use source_info::SourceInfo;
pub use token::{Document, MapEntry, TokenValue, YamlToken, scalar_to_string};

// Re-exported so downstream crates can match on scalar values without
// depending on yaml-rust2 directly.
pub use yaml_rust2::Yaml;
