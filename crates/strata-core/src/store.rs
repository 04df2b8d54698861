//! The class store: resolution cache plus reverse-dependency graph.

use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use strata_model::ClassKind;
use tracing::debug;

use crate::class::{DependentRef, ResolvedClass};
use crate::source::DocumentSource;

/// Keyed cache of resolved classes and nodes.
///
/// The store also maintains the inverse dependency graph (class id → ids of
/// classes that directly include it), which drives cascading invalidation:
/// merged values and fingerprints embed ancestor state, so removing an
/// ancestor must remove every descendant too.
///
/// The store is plain process-scoped state passed explicitly to the
/// resolver; it is not synchronized, and the surrounding driver must
/// serialize access.
#[derive(Debug, Default)]
pub struct ClassStore {
    classes: HashMap<String, ResolvedClass>,
    dependents: IndexMap<String, IndexSet<String>>,
    next_revision: u64,
}

impl ClassStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&ResolvedClass> {
        self.classes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.classes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Insert a freshly resolved class, replacing any live entry for its id.
    pub fn put(&mut self, class: ResolvedClass) {
        self.classes.insert(class.id.clone(), class);
    }

    /// Hand out the next resolution revision counter.
    pub fn next_revision(&mut self) -> u64 {
        self.next_revision += 1;
        self.next_revision
    }

    /// Record that `dependent` directly includes `parent_id`, both in the
    /// graph and on the cached parent's own dependents listing.
    pub fn record_dependency(
        &mut self,
        parent_id: &str,
        dependent_id: &str,
        dependent_kind: ClassKind,
        dependent_name: &str,
    ) {
        self.dependents
            .entry(parent_id.to_string())
            .or_default()
            .insert(dependent_id.to_string());

        if let Some(parent) = self.classes.get_mut(parent_id) {
            parent.dependents.insert(
                dependent_id.to_string(),
                DependentRef {
                    kind: dependent_kind,
                    name: dependent_name.to_string(),
                },
            );
        }
    }

    /// Ids that directly depend on `id`. Entries may refer to classes that
    /// are no longer cached; that is tolerated.
    pub fn dependents_of(&self, id: &str) -> Vec<String> {
        self.dependents
            .get(id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Remove `id` from the cache, then cascade through the reverse
    /// dependency graph so every transitive dependent is removed too.
    pub fn invalidate(&mut self, id: &str) {
        let mut visited = HashSet::new();
        self.invalidate_inner(id, &mut visited);
    }

    fn invalidate_inner(&mut self, id: &str, visited: &mut HashSet<String>) {
        if !visited.insert(id.to_string()) {
            return;
        }
        if self.classes.remove(id).is_some() {
            debug!(class_id = id, "invalidated cached class");
        }
        // Drop edges where `id` is the dependent side; they are re-recorded
        // on the next resolution.
        for set in self.dependents.values_mut() {
            set.shift_remove(id);
        }
        for dependent in self.dependents_of(id) {
            self.invalidate_inner(&dependent, visited);
        }
    }

    /// Invalidate every cached class whose backing file has been modified or
    /// removed since it was resolved, cascading as usual. Call this at the
    /// start of every resolution pass triggered by a change notification.
    pub fn invalidate_modified<S: DocumentSource>(&mut self, source: &S) {
        let stale: Vec<String> = self
            .classes
            .values()
            .filter(|class| source.modified(&class.filename) != Some(class.source_modified_at))
            .map(|class| class.id.clone())
            .collect();
        for id in stale {
            debug!(class_id = %id, "backing file changed, invalidating");
            self.invalidate(&id);
        }
    }
}
