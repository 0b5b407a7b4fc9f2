//! Incremental update engine
//!
//! An edited definition is re-translated in full and diffed against the
//! concept's previously recorded set; the structural tree diff is deliberately
//! not attempted. The caller loops this over every touched concept, applies
//! the merged delta to the live ontology in one batch, and flushes once.

use termlogic_axioms::{translate_definition, AxiomDelta, AxiomRepository, TranslateError};
use termlogic_model::{DefinitionTree, Nid};

/// Recompute one edited concept's axioms and swap them into the repository,
/// returning the additions/deletions delta for the live ontology.
///
/// A translation failure leaves the previously recorded set untouched.
pub fn process_incremental(
    tree: &DefinitionTree,
    concept: Nid,
    repo: &AxiomRepository,
) -> Result<AxiomDelta, TranslateError> {
    let axioms = translate_definition(tree, concept, repo)?;
    Ok(repo.replace_axioms(concept, axioms))
}
