//! Terminology-store boundary
//!
//! The classification pipeline never talks to a concrete storage engine. It
//! reads stated definitions through `TerminologyStore`, which any embedding
//! application implements over its own store. `MemoryStore` is the bundled
//! implementation for tests and programmatic staging.

use crate::{DefinitionTree, Nid};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/// One stated-definition semantic: the semantic's own nid plus the concept
/// it defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatedSemantic {
    pub semantic: Nid,
    pub concept: Nid,
}

/// Read-only view of the terminology store, as the pipeline needs it.
///
/// `stated_semantics` returns a snapshot the caller is free to iterate in
/// parallel; `definition_tree` must be safe to call concurrently from many
/// workers.
pub trait TerminologyStore: Send + Sync {
    /// Latest-state activity check, used to exclude retired concepts from
    /// classification.
    fn is_active(&self, concept: Nid) -> bool;

    /// All semantics of the given stated-definition pattern.
    fn stated_semantics(&self, pattern: Nid) -> Vec<StatedSemantic>;

    /// The deserialized definition tree for one semantic, if it exists.
    fn definition_tree(&self, semantic: Nid) -> Option<Arc<DefinitionTree>>;

    /// Human-readable description of a nid. Diagnostics only; correctness
    /// never depends on it.
    fn describe(&self, nid: Nid) -> String {
        format!("nid {nid}")
    }
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// DashMap-backed store for tests and programmatic embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    active: DashMap<Nid, bool>,
    semantics: DashMap<Nid, Vec<StatedSemantic>>,
    trees: DashMap<Nid, Arc<DefinitionTree>>,
    labels: DashMap<Nid, String>,
    next_semantic: AtomicI32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_semantic: AtomicI32::new(1_000_000),
            ..Default::default()
        }
    }

    /// Register a concept and its activity state.
    pub fn add_concept(&self, concept: Nid, active: bool) {
        self.active.insert(concept, active);
    }

    /// Attach a label for `describe` output.
    pub fn add_label(&self, nid: Nid, label: impl Into<String>) {
        self.labels.insert(nid, label.into());
    }

    /// Stage a stated definition for `concept` under `pattern`, returning the
    /// minted semantic nid.
    pub fn put_definition(&self, pattern: Nid, concept: Nid, tree: DefinitionTree) -> Nid {
        let semantic = Nid::new(self.next_semantic.fetch_add(1, Ordering::Relaxed));
        self.trees.insert(semantic, Arc::new(tree));
        self.semantics
            .entry(pattern)
            .or_default()
            .push(StatedSemantic { semantic, concept });
        semantic
    }

    /// Replace the tree behind an existing semantic (simulates an edit).
    pub fn replace_tree(&self, semantic: Nid, tree: DefinitionTree) {
        self.trees.insert(semantic, Arc::new(tree));
    }
}

impl TerminologyStore for MemoryStore {
    fn is_active(&self, concept: Nid) -> bool {
        self.active.get(&concept).map(|a| *a).unwrap_or(false)
    }

    fn stated_semantics(&self, pattern: Nid) -> Vec<StatedSemantic> {
        self.semantics
            .get(&pattern)
            .map(|v| v.clone())
            .unwrap_or_default()
    }

    fn definition_tree(&self, semantic: Nid) -> Option<Arc<DefinitionTree>> {
        self.trees.get(&semantic).map(|t| Arc::clone(&t))
    }

    fn describe(&self, nid: Nid) -> String {
        match self.labels.get(&nid) {
            Some(label) => format!("{} ({nid})", label.as_str()),
            None => format!("nid {nid}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogicalVertex;

    #[test]
    fn staged_definitions_come_back_by_pattern() {
        let store = MemoryStore::new();
        let pattern = Nid::new(100);
        let concept = Nid::new(-42);
        store.add_concept(concept, true);
        let semantic = store.put_definition(
            pattern,
            concept,
            DefinitionTree::necessary(vec![LogicalVertex::concept(Nid::new(-43))]),
        );

        let semantics = store.stated_semantics(pattern);
        assert_eq!(semantics.len(), 1);
        assert_eq!(semantics[0].concept, concept);
        assert!(store.definition_tree(semantic).is_some());
        assert!(store.is_active(concept));
        assert!(!store.is_active(Nid::new(-999)));
    }

    #[test]
    fn describe_prefers_labels() {
        let store = MemoryStore::new();
        store.add_label(Nid::new(7), "Occupation");
        assert_eq!(store.describe(Nid::new(7)), "Occupation (7)");
        assert_eq!(store.describe(Nid::new(8)), "nid 8");
    }
}
