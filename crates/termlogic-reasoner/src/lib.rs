//! Termlogic reasoner: the classifier boundary
//!
//! The classification engine treats the reasoner as a black box: load an
//! axiom set, apply deltas, compute the subsumption hierarchy, query direct
//! taxonomy neighbors in symbol space. This crate defines that boundary as
//! the `Reasoner` trait and ships one conforming implementation,
//! `ElReasoner`, an in-memory EL saturation engine covering exactly the
//! axiom forms the translator emits. Anything conforming to the trait —
//! a binding to an external classifier, or a canned mock in a test — can
//! take its place.

pub mod saturation;

use termlogic_axioms::{Axiom, AxiomDelta, ClassSym};
use thiserror::Error;

pub use saturation::ElReasoner;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReasonerError {
    /// A taxonomy query arrived before any inference computation.
    #[error("taxonomy not computed; classify before querying")]
    TaxonomyNotComputed,

    /// Implementation-specific failure.
    #[error("reasoner failure: {0}")]
    Internal(String),
}

/// The narrow classifier interface.
///
/// Query methods return *direct* taxonomy neighbors — immediate parents,
/// immediate children, and the equivalence group — in the reasoner's own
/// symbol space. The universal top and bottom classes may appear in answers
/// (a class with no named parent reports the top class); mapping back to
/// terminology identifiers and filtering the pseudo-classes is the caller's
/// concern.
pub trait Reasoner: Send {
    /// Replace the loaded ontology with `axioms`, discarding prior state.
    fn load_ontology(&mut self, axioms: Vec<Axiom>) -> Result<(), ReasonerError>;

    /// Apply an incremental change to the loaded ontology: deletions first,
    /// then additions. Inferences are stale until the next flush.
    fn apply_delta(&mut self, delta: &AxiomDelta) -> Result<(), ReasonerError>;

    /// Compute the full subsumption hierarchy. One long-running blocking
    /// call; not preemptible.
    fn classify(&mut self) -> Result<(), ReasonerError>;

    /// Refresh inferences after applied deltas.
    fn flush(&mut self) -> Result<(), ReasonerError>;

    fn direct_super_classes(&self, class: ClassSym) -> Result<Vec<ClassSym>, ReasonerError>;

    fn direct_sub_classes(&self, class: ClassSym) -> Result<Vec<ClassSym>, ReasonerError>;

    /// Classes equivalent to `class`, excluding `class` itself.
    fn equivalent_classes(&self, class: ClassSym) -> Result<Vec<ClassSym>, ReasonerError>;
}
