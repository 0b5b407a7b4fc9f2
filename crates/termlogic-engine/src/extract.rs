//! Full extraction pipeline
//!
//! Visits every semantic of the stated-definition pattern in parallel,
//! translates active concepts' trees, and records them into the repository.
//! Inactive concepts are counted and skipped so retired content never
//! pollutes the classification universe. Per-concept failures become alerts
//! and the fan-out keeps going.

use crate::Alert;
use parking_lot::Mutex;
use rayon::prelude::*;
use termlogic_axioms::{translate_definition, AxiomRepository};
use termlogic_model::{Nid, TerminologyStore};

/// Outcome of one full extraction.
#[derive(Debug)]
pub struct ExtractionSummary {
    pub total_semantics: usize,
    pub active: usize,
    pub inactive: usize,
    pub alerts: Vec<Alert>,
}

/// Populate `repo` from every stated-definition semantic under `pattern`.
///
/// `on_progress` fires once per `progress_interval` processed semantics and
/// once at the end; it must tolerate being called from worker threads.
/// On return the repository's classification universe is frozen, sorted.
pub fn extract_all(
    store: &dyn TerminologyStore,
    pattern: Nid,
    repo: &AxiomRepository,
    progress_interval: usize,
    on_progress: &(dyn Fn(usize, usize) + Sync),
) -> ExtractionSummary {
    let semantics = store.stated_semantics(pattern);
    let total = semantics.len();
    let alerts: Mutex<Vec<Alert>> = Mutex::new(Vec::new());

    tracing::debug!(total, "starting full extraction");

    semantics.par_iter().for_each(|semantic| {
        let processed = repo.bump_processed();
        if progress_interval > 0 && processed % progress_interval == 0 {
            on_progress(processed, total);
        }

        if !store.is_active(semantic.concept) {
            repo.bump_inactive();
            return;
        }

        let Some(tree) = store.definition_tree(semantic.semantic) else {
            alerts
                .lock()
                .push(Alert::missing_definition(semantic.concept, semantic.semantic));
            return;
        };

        match translate_definition(&tree, semantic.concept, repo) {
            Ok(axioms) => match repo.record_axioms(semantic.concept, axioms) {
                Ok(()) => repo.bump_active(),
                Err(err) => alerts.lock().push(Alert::from(err)),
            },
            Err(err) => alerts.lock().push(Alert::from(err)),
        }
    });

    repo.freeze_universe();
    on_progress(repo.processed(), total);

    ExtractionSummary {
        total_semantics: total,
        active: repo.active(),
        inactive: repo.inactive(),
        alerts: alerts.into_inner(),
    }
}
