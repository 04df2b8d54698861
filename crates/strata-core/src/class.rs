//! Resolved classes and their inheritance metadata.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::SystemTime;

use indexmap::IndexMap;
use strata_model::{ClassKind, ResolvedParam};

/// Compute the cache id for a (kind, name) pair, e.g. `class:app.web`.
pub fn class_id(kind: ClassKind, name: &str) -> String {
    format!("{}:{}", kind.as_str(), name.trim())
}

/// One declared parent of a class.
///
/// When resolving the parent failed, `error` carries the rendered failure
/// and `nested` is empty; the enclosing class still resolves without it.
#[derive(Debug, Clone)]
pub struct ParentRecord {
    pub name: String,
    pub error: Option<String>,
    /// The parent's own parent records, for dependency display.
    pub nested: Vec<ParentRecord>,
}

/// One class's contribution of an application name.
#[derive(Debug, Clone)]
pub struct AppSource {
    pub class_id: String,
    pub comments: Vec<String>,
}

/// An application aggregated across the inheritance chain.
#[derive(Debug, Clone, Default)]
pub struct Application {
    /// Contributors in resolution order, earliest first.
    pub sources: Vec<AppSource>,
}

/// A class that directly declares this one as a parent.
#[derive(Debug, Clone)]
pub struct DependentRef {
    pub kind: ClassKind,
    pub name: String,
}

/// A fully resolved class or node.
#[derive(Debug, Clone)]
pub struct ResolvedClass {
    /// Unique per (kind, normalized name); cache key in the class store.
    pub id: String,
    pub name: String,
    pub kind: ClassKind,

    /// Path of the backing document.
    pub filename: PathBuf,
    /// True when the document is a `<name>/init.yml` namespace file.
    pub is_init_document: bool,

    /// Directly declared parents, in declaration order.
    pub parents: Vec<ParentRecord>,

    /// Applications aggregated from ancestors and this document.
    pub applications: IndexMap<String, Application>,

    /// Classes that directly include this one, recorded as they resolve.
    pub dependents: IndexMap<String, DependentRef>,

    /// The fully merged parameter tree.
    pub params: ResolvedParam,

    /// Leading comment block of the backing document.
    pub document_comments: Vec<String>,

    /// Content fingerprint: hash of the document path, its modification time
    /// and every ancestor fingerprint, so any ancestor change shows through.
    pub fingerprint: String,

    /// Modification time of the backing document when it was resolved.
    pub source_modified_at: SystemTime,

    /// First-level duplicate guard: parent names directly declared by this
    /// document.
    pub declared_parents: HashSet<String>,

    /// Monotonic counter stamped by the store; a re-resolution after
    /// invalidation yields a higher value even when the content is identical.
    pub revision: u64,
}

impl ResolvedClass {
    /// Names of parents whose resolution failed.
    pub fn failed_parents(&self) -> impl Iterator<Item = &ParentRecord> {
        self.parents.iter().filter(|p| p.error.is_some())
    }

    /// True when at least one declared parent could not be resolved.
    pub fn has_errors(&self) -> bool {
        self.parents.iter().any(|p| p.error.is_some())
    }
}
