//! Integration tests for the complete classification pipeline
//!
//! These tests verify end-to-end functionality across crates:
//! - Definition trees → translation → repository population
//! - Full classification run → taxonomy queries in nid space
//! - Incremental edits → batched deltas → refreshed taxonomy
//! - Diagnostic dumps
//!
//! Run with: cargo test --test integration_tests

use std::collections::BTreeSet;
use std::sync::Arc;
use termlogic_engine::{ClassificationSession, SessionConfig, SessionState};
use termlogic_model::{DefinitionTree, LogicalVertex as V, MemoryStore, Nid};
use termlogic_reasoner::ElReasoner;

const PATTERN: Nid = Nid::new(500);

const BODY_STRUCTURE: Nid = Nid::new(-1);
const ORGAN: Nid = Nid::new(-2);
const HEART: Nid = Nid::new(-3);
const HEART_VALVE: Nid = Nid::new(-4);
const FINDING: Nid = Nid::new(-5);
const HEART_FINDING: Nid = Nid::new(-6);
const VALVE_FINDING: Nid = Nid::new(-7);
const FINDING_SITE: Nid = Nid::new(-20);
const PART_OF: Nid = Nid::new(-21);

fn nids(raws: &[Nid]) -> BTreeSet<Nid> {
    raws.iter().copied().collect()
}

/// A miniature anatomy/findings ontology:
/// - Organ ⊑ BodyStructure, Heart ⊑ Organ, HeartValve ⊑ BodyStructure ⊓ ∃partOf.Heart
/// - HeartFinding ≡ Finding ⊓ ∃findingSite.Heart
/// - ValveFinding ⊑ Finding ⊓ ∃findingSite.HeartValve
fn anatomy_store() -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    for concept in [
        BODY_STRUCTURE,
        ORGAN,
        HEART,
        HEART_VALVE,
        FINDING,
        HEART_FINDING,
        VALVE_FINDING,
    ] {
        store.add_concept(concept, true);
    }
    store.add_label(HEART, "Heart structure");
    store.add_label(FINDING_SITE, "Finding site");

    store.put_definition(
        PATTERN,
        ORGAN,
        DefinitionTree::necessary(vec![V::concept(BODY_STRUCTURE)]),
    );
    store.put_definition(
        PATTERN,
        HEART,
        DefinitionTree::necessary(vec![V::concept(ORGAN)]),
    );
    store.put_definition(
        PATTERN,
        HEART_VALVE,
        DefinitionTree::necessary(vec![
            V::concept(BODY_STRUCTURE),
            V::some(PART_OF, V::concept(HEART)),
        ]),
    );
    store.put_definition(
        PATTERN,
        HEART_FINDING,
        DefinitionTree::sufficient(vec![
            V::concept(FINDING),
            V::some(FINDING_SITE, V::concept(HEART)),
        ]),
    );
    store.put_definition(
        PATTERN,
        VALVE_FINDING,
        DefinitionTree::necessary(vec![
            V::concept(FINDING),
            V::some(FINDING_SITE, V::concept(HEART_VALVE)),
        ]),
    );
    Arc::new(store)
}

fn anatomy_session(store: Arc<MemoryStore>) -> ClassificationSession {
    ClassificationSession::new(
        store,
        Box::new(ElReasoner::new()),
        SessionConfig::new(PATTERN),
    )
}

#[tokio::test]
async fn full_run_builds_the_expected_taxonomy() {
    let mut session = anatomy_session(anatomy_store());
    let results = session.run_full().await.unwrap();

    assert_eq!(session.state(), SessionState::ReadyForIncremental);
    assert_eq!(session.parents(HEART), nids(&[ORGAN]));
    assert_eq!(session.parents(ORGAN), nids(&[BODY_STRUCTURE]));
    assert_eq!(session.children(BODY_STRUCTURE), nids(&[ORGAN, HEART_VALVE]));

    // Primitive roots classify directly under top, which post-processing
    // filters out.
    assert_eq!(session.parents(BODY_STRUCTURE), BTreeSet::new());
    assert_eq!(session.parents(FINDING), BTreeSet::new());

    // The frozen universe holds exactly the concepts with stated
    // definitions, sorted ascending.
    assert_eq!(
        results.concept_set(),
        &[VALVE_FINDING, HEART_FINDING, HEART_VALVE, HEART, ORGAN]
    );

    assert_eq!(results.stats.active, 5);
    assert_eq!(results.stats.inactive, 0);
}

#[tokio::test]
async fn defined_concepts_attract_matching_subconcepts() {
    // A finding sited on a part of the heart is not automatically a heart
    // finding (no propagation without a role chain), but a finding sited on
    // the heart itself is, because HeartFinding is fully defined.
    let pericarditis = Nid::new(-8);
    let store = anatomy_store();
    store.add_concept(pericarditis, true);
    store.put_definition(
        PATTERN,
        pericarditis,
        DefinitionTree::necessary(vec![
            V::concept(FINDING),
            V::some(FINDING_SITE, V::concept(HEART)),
        ]),
    );

    let mut session = anatomy_session(store);
    session.run_full().await.unwrap();
    assert_eq!(session.parents(pericarditis), nids(&[HEART_FINDING]));
}

#[tokio::test]
async fn incremental_edit_moves_a_concept() {
    let store = anatomy_store();
    let mut session = anatomy_session(Arc::clone(&store));
    session.run_full().await.unwrap();

    assert_eq!(session.parents(HEART), nids(&[ORGAN]));

    // Reclassify Heart directly under BodyStructure.
    let edited = DefinitionTree::necessary(vec![V::concept(BODY_STRUCTURE)]);
    session.run_incremental(vec![(edited, HEART)]).await.unwrap();

    assert_eq!(session.parents(HEART), nids(&[BODY_STRUCTURE]));
    assert_eq!(
        session.children(BODY_STRUCTURE),
        nids(&[ORGAN, HEART, HEART_VALVE])
    );

    // The universe is still the one frozen by the full run.
    assert_eq!(session.concept_set().len(), 5);
}

#[tokio::test]
async fn batched_edits_share_one_flush() {
    let store = anatomy_store();
    let mut session = anatomy_session(Arc::clone(&store));
    session.run_full().await.unwrap();

    let edits = vec![
        (
            DefinitionTree::necessary(vec![V::concept(BODY_STRUCTURE)]),
            HEART,
        ),
        (
            DefinitionTree::necessary(vec![V::concept(BODY_STRUCTURE)]),
            HEART_VALVE,
        ),
    ];
    session.run_incremental(edits).await.unwrap();

    assert_eq!(session.parents(HEART), nids(&[BODY_STRUCTURE]));
    assert_eq!(session.parents(HEART_VALVE), nids(&[BODY_STRUCTURE]));
}

#[tokio::test]
async fn equivalent_definitions_collapse() {
    let store = anatomy_store();
    let cardiac_finding = Nid::new(-9);
    store.add_concept(cardiac_finding, true);
    // Same fully-defined expression as HeartFinding.
    store.put_definition(
        PATTERN,
        cardiac_finding,
        DefinitionTree::sufficient(vec![
            V::concept(FINDING),
            V::some(FINDING_SITE, V::concept(HEART)),
        ]),
    );

    let mut session = anatomy_session(store);
    session.run_full().await.unwrap();

    assert_eq!(session.equivalents(HEART_FINDING), nids(&[cardiac_finding]));
    assert_eq!(session.equivalents(cardiac_finding), nids(&[HEART_FINDING]));
}

#[tokio::test]
async fn diagnostics_dump_round_trips_through_text_and_json() {
    let mut session = anatomy_session(anatomy_store());
    let results = session.run_full().await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    termlogic_engine::dump_repository(dir.path(), session.repository()).unwrap();
    termlogic_engine::dump_results(dir.path(), &results).unwrap();

    let axioms = std::fs::read_to_string(dir.path().join("axioms.txt")).unwrap();
    assert!(axioms.contains("EquivalentClasses("));
    assert!(axioms.contains("ObjectSomeValuesFrom("));

    let json = std::fs::read_to_string(dir.path().join("results.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(parsed.get("stats").is_some());
}
