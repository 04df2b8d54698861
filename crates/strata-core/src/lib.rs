//! # strata-core
//!
//! Resolution of a class-based, multiple-inheritance configuration model.
//!
//! Classes and nodes are YAML documents declaring an ordered list of parent
//! classes, a parameter map and a list of named applications. The
//! [`Resolver`] loads a requested document through a [`DocumentSource`],
//! resolves and deep-merges every parent in declaration order, merges the
//! document's own parameters on top, aggregates applications, computes a
//! content fingerprint and caches the result in a [`ClassStore`].
//!
//! The store maintains the inverse dependency graph so that invalidating any
//! document also invalidates everything that transitively includes it. Node
//! views additionally get `${path}` reference expansion via
//! [`interpolate`].
//!
//! Everything here is synchronous and unsynchronized; the surrounding driver
//! serializes rebuilds.
//!
//! ## Example
//!
//! ```rust
//! use strata_core::{MemorySource, Resolver};
//!
//! let mut source = MemorySource::new();
//! source.insert_class("base", "parameters:\n  port: 80\n");
//! source.insert_node("web01", "classes:\n  - base\nparameters:\n  host: web01\n");
//!
//! let mut resolver = Resolver::new(source);
//! let node = resolver.resolve_node("web01").unwrap();
//! assert_eq!(
//!     node.params.get("port").unwrap().as_scalar().unwrap().as_i64(),
//!     Some(80)
//! );
//! ```

mod class;
mod error;
mod interpolate;
mod resolver;
mod source;
mod store;

pub use class::{AppSource, Application, DependentRef, ParentRecord, ResolvedClass, class_id};
pub use error::{ResolveError, Result};
pub use interpolate::interpolate;
pub use resolver::{DEFAULT_MAX_DEPTH, Resolver};
pub use source::{DocumentSource, FsSource, Located, MemorySource};
pub use store::ClassStore;

// Re-exports so callers can work with resolved trees without naming the
// model crate.
pub use strata_model::{ClassKind, MergeOutcome, ParamSource, ParamValue, ResolvedParam};
