//! Axiom repository
//!
//! The shared mutable state of one classification session: which axioms each
//! concept currently contributes, the deduplicated aggregate set handed to
//! the classifier, the nid ↔ symbol tables, and the frozen classification
//! universe. Built for parallel population — extraction fans out across a
//! worker pool and every worker records into the same repository.

use crate::axiom::{Axiom, AxiomDelta};
use crate::symbols::{ClassSym, PropSym, SymbolTable};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use termlogic_model::Nid;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// A concept's axioms were recorded twice without an intervening
    /// replacement. Indicates double-processing upstream; the first
    /// recording is left intact.
    #[error("axioms already recorded for concept {concept}")]
    DuplicateDefinition { concept: Nid },
}

/// Per-session axiom bookkeeping. All methods take `&self`; interior state
/// is DashMap shards and atomics so extraction workers contend per key, not
/// globally.
#[derive(Debug)]
pub struct AxiomRepository {
    symbols: SymbolTable,
    recorded: DashMap<Nid, HashSet<Axiom>>,
    /// Aggregate axiom set with ownership counts: an axiom stays in the
    /// classifier input as long as at least one concept still derives it.
    aggregate: DashMap<Axiom, usize>,
    processed: AtomicUsize,
    active: AtomicUsize,
    inactive: AtomicUsize,
    universe: RwLock<Arc<Vec<Nid>>>,
}

impl AxiomRepository {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            recorded: DashMap::new(),
            aggregate: DashMap::new(),
            processed: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            inactive: AtomicUsize::new(0),
            universe: RwLock::new(Arc::new(Vec::new())),
        }
    }

    // ========================================================================
    // Symbols
    // ========================================================================

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Memoized class symbol for a concept.
    pub fn class_sym(&self, concept: Nid) -> ClassSym {
        self.symbols.class_sym(concept)
    }

    /// Memoized property symbol for a role.
    pub fn prop_sym(&self, role: Nid) -> PropSym {
        self.symbols.prop_sym(role)
    }

    // ========================================================================
    // Recording
    // ========================================================================

    /// Record a concept's axiom set during full extraction. At most once per
    /// concept: a second call is a duplicate-definition error and leaves the
    /// first set untouched.
    pub fn record_axioms(
        &self,
        concept: Nid,
        axioms: HashSet<Axiom>,
    ) -> Result<(), RepositoryError> {
        match self.recorded.entry(concept) {
            Entry::Occupied(_) => Err(RepositoryError::DuplicateDefinition { concept }),
            Entry::Vacant(slot) => {
                for axiom in &axioms {
                    *self.aggregate.entry(axiom.clone()).or_insert(0) += 1;
                }
                slot.insert(axioms);
                Ok(())
            }
        }
    }

    /// Swap a concept's recorded set for `new_axioms`, returning the true
    /// set-difference delta. An axiom also derived by another concept stays
    /// in the aggregate even when this concept drops it. A concept with no
    /// prior recording contributes everything as additions.
    pub fn replace_axioms(&self, concept: Nid, new_axioms: HashSet<Axiom>) -> AxiomDelta {
        let mut slot = self.recorded.entry(concept).or_default();
        let old = std::mem::replace(&mut *slot, new_axioms);
        let new = &*slot;

        let additions: Vec<Axiom> = new.difference(&old).cloned().collect();
        let deletions: Vec<Axiom> = old.difference(new).cloned().collect();
        drop(slot);

        for axiom in &additions {
            *self.aggregate.entry(axiom.clone()).or_insert(0) += 1;
        }
        for axiom in &deletions {
            if let Entry::Occupied(mut owned) = self.aggregate.entry(axiom.clone()) {
                if *owned.get() <= 1 {
                    owned.remove();
                } else {
                    *owned.get_mut() -= 1;
                }
            }
        }

        AxiomDelta {
            additions,
            deletions,
        }
    }

    /// The axiom set most recently recorded for a concept.
    pub fn axioms_for(&self, concept: Nid) -> Option<HashSet<Axiom>> {
        self.recorded.get(&concept).map(|set| set.clone())
    }

    /// Snapshot of the aggregate axiom set, the classifier's input.
    pub fn aggregate_axioms(&self) -> Vec<Axiom> {
        self.aggregate.iter().map(|e| e.key().clone()).collect()
    }

    pub fn aggregate_contains(&self, axiom: &Axiom) -> bool {
        self.aggregate.contains_key(axiom)
    }

    pub fn aggregate_len(&self) -> usize {
        self.aggregate.len()
    }

    pub fn concept_count(&self) -> usize {
        self.recorded.len()
    }

    // ========================================================================
    // Counters
    // ========================================================================

    /// Increment the processed counter, returning the new total.
    pub fn bump_processed(&self) -> usize {
        self.processed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn bump_active(&self) {
        self.active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bump_inactive(&self) {
        self.inactive.fetch_add(1, Ordering::Relaxed);
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    pub fn inactive(&self) -> usize {
        self.inactive.load(Ordering::Relaxed)
    }

    // ========================================================================
    // Classification universe
    // ========================================================================

    /// Freeze the set of concepts that participated in the last full
    /// extraction, sorted for deterministic downstream iteration.
    pub fn freeze_universe(&self) {
        let mut concepts: Vec<Nid> = self.recorded.iter().map(|e| *e.key()).collect();
        concepts.sort_unstable();
        *self.universe.write() = Arc::new(concepts);
    }

    /// The frozen universe from the last full extraction.
    pub fn universe(&self) -> Arc<Vec<Nid>> {
        Arc::clone(&self.universe.read())
    }
}

impl Default for AxiomRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axiom::ClassExpr;

    fn sub(a: u32, b: u32) -> Axiom {
        Axiom::SubClassOf {
            sub: ClassExpr::Class(ClassSym::new(a)),
            sup: ClassExpr::Class(ClassSym::new(b)),
        }
    }

    #[test]
    fn duplicate_recording_is_rejected_and_first_set_survives() {
        let repo = AxiomRepository::new();
        let concept = Nid::new(1);
        let first: HashSet<Axiom> = [sub(10, 11)].into_iter().collect();
        let second: HashSet<Axiom> = [sub(10, 12)].into_iter().collect();

        repo.record_axioms(concept, first.clone()).unwrap();
        let err = repo.record_axioms(concept, second).unwrap_err();
        assert_eq!(err, RepositoryError::DuplicateDefinition { concept });
        assert_eq!(repo.axioms_for(concept), Some(first));
    }

    #[test]
    fn replace_returns_true_set_difference() {
        let repo = AxiomRepository::new();
        let concept = Nid::new(2);
        let a1 = sub(1, 2);
        let a2 = sub(1, 3);
        let a3 = sub(1, 4);
        let a4 = sub(1, 5);

        repo.record_axioms(concept, [a1.clone(), a2.clone(), a3.clone()].into_iter().collect())
            .unwrap();
        let delta = repo.replace_axioms(
            concept,
            [a2.clone(), a3.clone(), a4.clone()].into_iter().collect(),
        );

        assert_eq!(delta.additions, vec![a4.clone()]);
        assert_eq!(delta.deletions, vec![a1.clone()]);
        assert!(!repo.aggregate_contains(&a1));
        assert!(repo.aggregate_contains(&a2));
        assert!(repo.aggregate_contains(&a3));
        assert!(repo.aggregate_contains(&a4));
    }

    #[test]
    fn shared_axioms_survive_one_owner_dropping_them() {
        let repo = AxiomRepository::new();
        let shared = sub(7, 8);

        repo.record_axioms(Nid::new(1), [shared.clone()].into_iter().collect())
            .unwrap();
        repo.record_axioms(Nid::new(2), [shared.clone()].into_iter().collect())
            .unwrap();

        let delta = repo.replace_axioms(Nid::new(1), HashSet::new());
        assert_eq!(delta.deletions, vec![shared.clone()]);
        assert!(repo.aggregate_contains(&shared), "second owner still holds it");

        repo.replace_axioms(Nid::new(2), HashSet::new());
        assert!(!repo.aggregate_contains(&shared));
    }

    #[test]
    fn universe_freezes_sorted() {
        let repo = AxiomRepository::new();
        for (i, raw) in [30, -4, 12].into_iter().enumerate() {
            repo.record_axioms(Nid::new(raw), [sub(100 + i as u32, 2)].into_iter().collect())
                .unwrap();
        }
        repo.freeze_universe();
        let universe = repo.universe();
        assert_eq!(
            *universe,
            vec![Nid::new(-4), Nid::new(12), Nid::new(30)]
        );
    }

    #[test]
    fn concurrent_recording_loses_no_updates() {
        let repo = AxiomRepository::new();
        std::thread::scope(|scope| {
            for chunk in 0..8 {
                let repo = &repo;
                scope.spawn(move || {
                    for i in 0..50 {
                        let concept = Nid::new(chunk * 50 + i);
                        let axioms: HashSet<Axiom> =
                            [sub(concept.raw() as u32, 1)].into_iter().collect();
                        repo.record_axioms(concept, axioms).unwrap();
                        repo.bump_active();
                        repo.bump_processed();
                    }
                });
            }
        });
        assert_eq!(repo.concept_count(), 400);
        assert_eq!(repo.active(), 400);
        assert_eq!(repo.processed(), 400);
        assert_eq!(repo.aggregate_len(), 400);
    }
}
