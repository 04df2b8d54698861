//! The resolver: drives tokenization and merging across the include graph.

use std::collections::HashSet;
use std::time::UNIX_EPOCH;

use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use strata_model::{ClassKind, ResolvedParam, merge_into, param_from_token};
use strata_yaml::{YamlToken, scalar_to_string};
use tracing::{debug, warn};

use crate::class::{AppSource, Application, ParentRecord, ResolvedClass, class_id};
use crate::error::{ResolveError, Result};
use crate::interpolate::interpolate;
use crate::source::DocumentSource;
use crate::store::ClassStore;

/// Default maximum include depth.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Resolves classes and nodes against a document source, caching results in
/// a [`ClassStore`].
///
/// Resolution is synchronous and runs to completion; the caller serializes
/// access. A parent failure degrades gracefully (recorded on the parent's
/// dependency record), while a failure on the requested document itself is
/// returned as an error.
pub struct Resolver<S: DocumentSource> {
    source: S,
    store: ClassStore,
    max_depth: usize,
}

impl<S: DocumentSource> Resolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            store: ClassStore::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn store(&self) -> &ClassStore {
        &self.store
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Drop a class/node and everything that transitively includes it.
    pub fn invalidate(&mut self, kind: ClassKind, name: &str) {
        self.store.invalidate(&class_id(kind, name));
    }

    /// Re-check every cached document's modification time, invalidating what
    /// changed. Call once at the start of a rebuild pass.
    pub fn invalidate_modified(&mut self) {
        self.store.invalidate_modified(&self.source);
    }

    /// Resolve a class. Class views are returned pre-interpolation.
    pub fn resolve_class(&mut self, name: &str) -> Result<ResolvedClass> {
        self.resolve(ClassKind::Class, name, 0)
    }

    /// Resolve a node and expand `${...}` references in its merged tree.
    pub fn resolve_node(&mut self, name: &str) -> Result<ResolvedClass> {
        self.resolve_node_with(name, true)
    }

    /// Resolve a node, optionally skipping interpolation.
    pub fn resolve_node_with(&mut self, name: &str, interpolated: bool) -> Result<ResolvedClass> {
        let class = self.resolve(ClassKind::Node, name, 0)?;
        if interpolated { interpolate(&class) } else { Ok(class) }
    }

    fn resolve(&mut self, kind: ClassKind, name: &str, depth: usize) -> Result<ResolvedClass> {
        let id = class_id(kind, name);

        if let Some(cached) = self.store.get(&id) {
            return Ok(cached.clone());
        }

        if depth > self.max_depth {
            return Err(ResolveError::DepthExceeded {
                class_id: id,
                limit: self.max_depth,
            });
        }

        debug!(class_id = %id, depth, "resolving");

        let located = self
            .source
            .locate(kind, name)
            .ok_or_else(|| ResolveError::NotFound {
                class_id: id.clone(),
            })?;

        let (text, modified) = self.source.read(&located.path).map_err(|source| {
            ResolveError::Io {
                class_id: id.clone(),
                path: located.path.clone(),
                source,
            }
        })?;

        let document = strata_yaml::parse_file(&text, &located.path.to_string_lossy())
            .map_err(|source| ResolveError::Parse {
                class_id: id.clone(),
                path: located.path.clone(),
                source,
            })?;

        // A whitespace- or comment-only file may parse as no document at all
        // or as a single null scalar; both read as empty.
        let root = document
            .root
            .filter(|token| !matches!(token.as_scalar(), Some(strata_yaml::Yaml::Null)))
            .ok_or_else(|| ResolveError::EmptyDocument {
                class_id: id.clone(),
                path: located.path.clone(),
            })?;
        if !root.is_mapping() {
            return Err(structure_error(&id, &located.path, "document root", "mapping"));
        }

        let mut params = ResolvedParam::new_mapping();
        let mut parents = Vec::new();
        let mut applications: IndexMap<String, Application> = IndexMap::new();
        let mut declared_parents = HashSet::new();
        let mut ancestor_fingerprints = Vec::new();

        // Inherited state, in declaration order.
        for entry in section_sequence(&root, "classes", &id, &located.path)? {
            let Some(parent_name) = entry.as_scalar().map(scalar_to_string).filter(|s| !s.is_empty())
            else {
                parents.push(ParentRecord {
                    name: String::new(),
                    error: Some("class reference must be a scalar name".to_string()),
                    nested: Vec::new(),
                });
                continue;
            };

            // First-level duplicate guard only; a common ancestor reached
            // through two different parents still merges once per path.
            if !declared_parents.insert(parent_name.clone()) {
                continue;
            }

            match self.resolve(ClassKind::Class, &parent_name, depth + 1) {
                Ok(parent) => {
                    self.store.record_dependency(&parent.id, &id, kind, name);

                    for (app_name, app) in &parent.applications {
                        applications
                            .entry(app_name.clone())
                            .or_default()
                            .sources
                            .extend(app.sources.iter().cloned());
                    }

                    merge_into(&mut params, &parent.params);
                    ancestor_fingerprints.push(parent.fingerprint.clone());
                    parents.push(ParentRecord {
                        name: parent_name,
                        error: None,
                        nested: parent.parents.clone(),
                    });
                }
                Err(err @ ResolveError::DepthExceeded { .. }) => return Err(err),
                Err(err) => {
                    warn!(class_id = %id, parent = %parent_name, error = %err, "parent failed, continuing without it");
                    parents.push(ParentRecord {
                        name: parent_name,
                        error: Some(err.to_string()),
                        nested: Vec::new(),
                    });
                }
            }
        }

        // Own applications, appended after everything inherited. The first
        // writer of a name fixes its position; later contributions only
        // extend its source list.
        for entry in section_sequence(&root, "applications", &id, &located.path)? {
            let Some(app_name) = entry.as_scalar().map(scalar_to_string).filter(|s| !s.is_empty())
            else {
                warn!(class_id = %id, "ignoring non-scalar applications entry");
                continue;
            };
            applications
                .entry(app_name)
                .or_default()
                .sources
                .push(AppSource {
                    class_id: id.clone(),
                    comments: entry.comments.clone(),
                });
        }

        // Own parameters merge last, so this document's values win over
        // anything inherited.
        if let Some(token) = root.get("parameters") {
            if !token.is_mapping() {
                return Err(structure_error(&id, &located.path, "parameters", "mapping"));
            }
            let own = param_from_token(token, &id, kind);
            merge_into(&mut params, &own);
        }

        let fingerprint = fingerprint(&located.path, modified, &ancestor_fingerprints);

        let class = ResolvedClass {
            id: id.clone(),
            name: name.trim().to_string(),
            kind,
            filename: located.path,
            is_init_document: located.is_init,
            parents,
            applications,
            dependents: IndexMap::new(),
            params,
            document_comments: document.comments,
            fingerprint,
            source_modified_at: modified,
            declared_parents,
            revision: self.store.next_revision(),
        };

        self.store.put(class.clone());
        Ok(class)
    }

}

/// Fetch a well-known sequence section, failing when it is present with the
/// wrong type.
fn section_sequence<'a>(
    root: &'a YamlToken,
    key: &'static str,
    id: &str,
    path: &std::path::Path,
) -> Result<&'a [YamlToken]> {
    match root.get(key) {
        None => Ok(&[]),
        Some(token) => token
            .as_sequence()
            .ok_or_else(|| structure_error(id, path, key, "sequence")),
    }
}

fn structure_error(
    id: &str,
    path: &std::path::Path,
    key: &str,
    expected: &'static str,
) -> ResolveError {
    ResolveError::Structure {
        class_id: id.to_string(),
        path: path.to_path_buf(),
        key: key.to_string(),
        expected,
    }
}

/// Hash the document path, its modification time and all ancestor
/// fingerprints into a stable content fingerprint.
fn fingerprint(
    path: &std::path::Path,
    modified: std::time::SystemTime,
    ancestors: &[String],
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    if let Ok(elapsed) = modified.duration_since(UNIX_EPOCH) {
        hasher.update(elapsed.as_nanos().to_le_bytes());
    }
    for ancestor in ancestors {
        hasher.update(ancestor.as_bytes());
    }
    format!("sha256:{:x}", hasher.finalize())
}
