//! Result post-processing
//!
//! Walks every nid-mapped class symbol, queries the reasoner for its direct
//! taxonomy neighbors, filters the universal top/bottom pseudo-classes, and
//! parses the remaining symbols' IRI local names back into nids. A symbol
//! that does not parse is reported as a data-integrity alert and dropped;
//! it never aborts the rest of the computation.

use crate::Alert;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use termlogic_axioms::symbols::parse_nid;
use termlogic_axioms::{AxiomRepository, ClassSym, BOTTOM, TOP};
use termlogic_model::Nid;
use termlogic_reasoner::{Reasoner, ReasonerError};

/// Statistics for one completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub processed: usize,
    pub active: usize,
    pub inactive: usize,
    pub axioms: usize,
    pub classified_concepts: usize,
    pub alerts: usize,
}

/// The reasoner's computed hierarchy, translated into nid space.
///
/// Query methods return empty sets for concepts the session has never seen;
/// an unclassified concept is a normal state, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassificationResults {
    universe: Vec<Nid>,
    parents: HashMap<Nid, BTreeSet<Nid>>,
    children: HashMap<Nid, BTreeSet<Nid>>,
    equivalents: HashMap<Nid, BTreeSet<Nid>>,
    pub stats: RunStats,
}

impl ClassificationResults {
    pub fn parents(&self, concept: Nid) -> BTreeSet<Nid> {
        self.parents.get(&concept).cloned().unwrap_or_default()
    }

    pub fn children(&self, concept: Nid) -> BTreeSet<Nid> {
        self.children.get(&concept).cloned().unwrap_or_default()
    }

    pub fn equivalents(&self, concept: Nid) -> BTreeSet<Nid> {
        self.equivalents.get(&concept).cloned().unwrap_or_default()
    }

    /// The frozen, sorted concept set from the last full extraction.
    pub fn concept_set(&self) -> &[Nid] {
        &self.universe
    }
}

/// Build results from a classified reasoner.
pub fn post_process(
    reasoner: &dyn Reasoner,
    repo: &AxiomRepository,
    stats: RunStats,
) -> Result<(ClassificationResults, Vec<Alert>), ReasonerError> {
    let mut alerts = Vec::new();
    let mut parents = HashMap::new();
    let mut children = HashMap::new();
    let mut equivalents = HashMap::new();

    let mut classes = repo.symbols().classes();
    classes.sort_unstable();

    for (concept, symbol) in classes {
        parents.insert(
            concept,
            to_nids(
                reasoner.direct_super_classes(symbol)?,
                concept,
                repo,
                &mut alerts,
            ),
        );
        children.insert(
            concept,
            to_nids(
                reasoner.direct_sub_classes(symbol)?,
                concept,
                repo,
                &mut alerts,
            ),
        );
        equivalents.insert(
            concept,
            to_nids(
                reasoner.equivalent_classes(symbol)?,
                concept,
                repo,
                &mut alerts,
            ),
        );
    }

    let mut stats = stats;
    stats.classified_concepts = parents.len();
    stats.alerts += alerts.len();

    let results = ClassificationResults {
        universe: repo.universe().to_vec(),
        parents,
        children,
        equivalents,
        stats,
    };
    Ok((results, alerts))
}

/// Translate reasoner symbols to nids, filtering the top and bottom
/// pseudo-classes, alerting on unparsable symbols.
fn to_nids(
    symbols: Vec<ClassSym>,
    concept: Nid,
    repo: &AxiomRepository,
    alerts: &mut Vec<Alert>,
) -> BTreeSet<Nid> {
    let mut out = BTreeSet::new();
    for symbol in symbols {
        if symbol == TOP || symbol == BOTTOM {
            continue;
        }
        match repo.symbols().class_iri(symbol) {
            Some(iri) => match parse_nid(&iri) {
                Some(nid) => {
                    out.insert(nid);
                }
                None => alerts.push(Alert::symbol_resolution(concept, iri)),
            },
            None => alerts.push(Alert::symbol_resolution(
                concept,
                format!("unregistered symbol {}", symbol.raw()),
            )),
        }
    }
    out
}
