//! Classification session
//!
//! One session owns the axiom repository and the reasoner for the lifetime
//! of a reasoning session: full run, then any number of incremental runs,
//! until a new full run supersedes the extracted state. The state machine is
//! explicit and the single-writer discipline falls out of `&mut self` on the
//! run methods — no global singleton, no hidden lock.
//!
//! Each pipeline stage is dispatched as its own blocking unit of work and
//! awaited before the next begins, so callers get progress events with
//! per-stage elapsed times between stages. The reasoner's own computation is
//! one non-preemptible blocking call; abandoning a run discards its result
//! rather than interrupting the computation.

use crate::results::{post_process, ClassificationResults, RunStats};
use crate::{
    extract_all, process_incremental, Alert, ClassificationEvent, EventHandler, Phase,
    ResultsConsumer,
};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use termlogic_axioms::{AxiomDelta, AxiomRepository};
use termlogic_model::{DefinitionTree, Nid, TerminologyStore};
use termlogic_reasoner::{Reasoner, ReasonerError};
use thiserror::Error;

/// Where a session stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Extracted,
    Loaded,
    InferencesComputed,
    /// Stable resting state: the session can absorb edits indefinitely.
    ReadyForIncremental,
    IncrementalApplied,
    Failed,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot {operation} in session state {actual:?}")]
    InvalidState {
        operation: &'static str,
        actual: SessionState,
    },

    #[error("{phase:?} stage failed: {message}")]
    Stage { phase: Phase, message: String },

    #[error(transparent)]
    Reasoner(#[from] ReasonerError),
}

/// Session configuration.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Pattern nid of the stated-definition semantics to extract.
    pub stated_pattern: Nid,
    /// Report extraction progress every this many semantics.
    pub progress_interval: usize,
}

impl SessionConfig {
    pub fn new(stated_pattern: Nid) -> Self {
        Self {
            stated_pattern,
            progress_interval: 100,
        }
    }
}

struct Handlers {
    events: RwLock<Vec<EventHandler>>,
    consumers: RwLock<Vec<ResultsConsumer>>,
}

impl Handlers {
    fn emit(&self, event: &ClassificationEvent) {
        for handler in self.events.read().iter() {
            handler(event);
        }
    }

    fn publish(&self, results: &ClassificationResults) {
        for consumer in self.consumers.read().iter() {
            consumer(results);
        }
    }
}

/// The classification orchestrator.
pub struct ClassificationSession {
    store: Arc<dyn TerminologyStore>,
    reasoner: Option<Box<dyn Reasoner>>,
    repo: Arc<AxiomRepository>,
    config: SessionConfig,
    state: SessionState,
    handlers: Arc<Handlers>,
    results: Option<Arc<ClassificationResults>>,
}

impl ClassificationSession {
    pub fn new(
        store: Arc<dyn TerminologyStore>,
        reasoner: Box<dyn Reasoner>,
        config: SessionConfig,
    ) -> Self {
        Self {
            store,
            reasoner: Some(reasoner),
            repo: Arc::new(AxiomRepository::new()),
            config,
            state: SessionState::Uninitialized,
            handlers: Arc::new(Handlers {
                events: RwLock::new(Vec::new()),
                consumers: RwLock::new(Vec::new()),
            }),
            results: None,
        }
    }

    /// Register a progress/alert event handler.
    pub fn on_event(&mut self, handler: EventHandler) {
        self.handlers.events.write().push(handler);
    }

    /// Register a consumer invoked with each completed run's results.
    pub fn on_results(&mut self, consumer: ResultsConsumer) {
        self.handlers.consumers.write().push(consumer);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn repository(&self) -> &AxiomRepository {
        &self.repo
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn parents(&self, concept: Nid) -> std::collections::BTreeSet<Nid> {
        self.results
            .as_ref()
            .map(|r| r.parents(concept))
            .unwrap_or_default()
    }

    pub fn children(&self, concept: Nid) -> std::collections::BTreeSet<Nid> {
        self.results
            .as_ref()
            .map(|r| r.children(concept))
            .unwrap_or_default()
    }

    pub fn equivalents(&self, concept: Nid) -> std::collections::BTreeSet<Nid> {
        self.results
            .as_ref()
            .map(|r| r.equivalents(concept))
            .unwrap_or_default()
    }

    /// The frozen concept set from the last full run.
    pub fn concept_set(&self) -> Vec<Nid> {
        self.results
            .as_ref()
            .map(|r| r.concept_set().to_vec())
            .unwrap_or_default()
    }

    pub fn results(&self) -> Option<Arc<ClassificationResults>> {
        self.results.clone()
    }

    // ========================================================================
    // Full run
    // ========================================================================

    /// Extract → load → compute inferences → post-process.
    ///
    /// Builds a fresh repository and a fresh ontology; a failure publishes
    /// nothing and leaves the session in `Failed`.
    pub async fn run_full(&mut self) -> Result<Arc<ClassificationResults>, SessionError> {
        match self.run_full_inner().await {
            Ok(results) => Ok(results),
            Err(err) => self.fail(err),
        }
    }

    async fn run_full_inner(&mut self) -> Result<Arc<ClassificationResults>, SessionError> {
        self.state = SessionState::Uninitialized;
        self.results = None;
        self.repo = Arc::new(AxiomRepository::new());

        // Extract.
        let started = self.phase_start(Phase::Extract);
        let store = Arc::clone(&self.store);
        let repo = Arc::clone(&self.repo);
        let handlers = Arc::clone(&self.handlers);
        let pattern = self.config.stated_pattern;
        let interval = self.config.progress_interval;
        let summary = tokio::task::spawn_blocking(move || {
            extract_all(store.as_ref(), pattern, &repo, interval, &|processed, total| {
                handlers.emit(&ClassificationEvent::Progress { processed, total });
            })
        })
        .await
        .map_err(|err| stage_error(Phase::Extract, &err))?;
        self.raise_alerts(&summary.alerts);
        self.phase_done(Phase::Extract, started);
        self.state = SessionState::Extracted;
        let stats = RunStats {
            processed: self.repo.processed(),
            active: summary.active,
            inactive: summary.inactive,
            axioms: self.repo.aggregate_len(),
            classified_concepts: 0,
            alerts: summary.alerts.len(),
        };

        // Load a fresh ontology.
        let started = self.phase_start(Phase::Load);
        let axioms = self.repo.aggregate_axioms();
        let mut reasoner = self.take_reasoner(Phase::Load)?;
        let (reasoner, loaded) = tokio::task::spawn_blocking(move || {
            let outcome = reasoner.load_ontology(axioms);
            (reasoner, outcome)
        })
        .await
        .map_err(|err| stage_error(Phase::Load, &err))?;
        self.reasoner = Some(reasoner);
        loaded?;
        self.phase_done(Phase::Load, started);
        self.state = SessionState::Loaded;

        // Compute inferences: the one opaque, long-running call.
        let started = self.phase_start(Phase::ComputeInferences);
        let mut reasoner = self.take_reasoner(Phase::ComputeInferences)?;
        let (reasoner, classified) = tokio::task::spawn_blocking(move || {
            let outcome = reasoner.classify();
            (reasoner, outcome)
        })
        .await
        .map_err(|err| stage_error(Phase::ComputeInferences, &err))?;
        self.reasoner = Some(reasoner);
        classified?;
        self.phase_done(Phase::ComputeInferences, started);
        self.state = SessionState::InferencesComputed;

        // Post-process.
        self.post_process_stage(stats).await
    }

    // ========================================================================
    // Incremental run
    // ========================================================================

    /// Apply edited definitions to the live ontology and refresh results.
    ///
    /// The repository and the reasoner's ontology are reused; deltas are
    /// batched into a single flush. Requires a completed prior run.
    pub async fn run_incremental(
        &mut self,
        edits: Vec<(DefinitionTree, Nid)>,
    ) -> Result<Arc<ClassificationResults>, SessionError> {
        if self.state != SessionState::ReadyForIncremental {
            return Err(SessionError::InvalidState {
                operation: "run an incremental update",
                actual: self.state,
            });
        }
        match self.run_incremental_inner(edits).await {
            Ok(results) => Ok(results),
            Err(err) => self.fail(err),
        }
    }

    async fn run_incremental_inner(
        &mut self,
        edits: Vec<(DefinitionTree, Nid)>,
    ) -> Result<Arc<ClassificationResults>, SessionError> {
        let started = self.phase_start(Phase::ApplyDeltas);
        let repo = Arc::clone(&self.repo);
        let mut reasoner = self.take_reasoner(Phase::ApplyDeltas)?;
        let (reasoner, applied) = tokio::task::spawn_blocking(move || {
            let mut merged = AxiomDelta::default();
            let mut alerts: Vec<Alert> = Vec::new();
            for (tree, concept) in &edits {
                match process_incremental(tree, *concept, &repo) {
                    Ok(delta) => merged.merge(delta),
                    Err(err) => alerts.push(Alert::from(err)),
                }
            }
            let outcome = reasoner.apply_delta(&merged);
            (reasoner, outcome.map(|()| alerts))
        })
        .await
        .map_err(|err| stage_error(Phase::ApplyDeltas, &err))?;
        self.reasoner = Some(reasoner);
        let alerts = applied?;
        self.raise_alerts(&alerts);
        self.phase_done(Phase::ApplyDeltas, started);
        self.state = SessionState::IncrementalApplied;

        // One flush for the whole batch.
        let started = self.phase_start(Phase::ComputeInferences);
        let mut reasoner = self.take_reasoner(Phase::ComputeInferences)?;
        let (reasoner, flushed) = tokio::task::spawn_blocking(move || {
            let outcome = reasoner.flush();
            (reasoner, outcome)
        })
        .await
        .map_err(|err| stage_error(Phase::ComputeInferences, &err))?;
        self.reasoner = Some(reasoner);
        flushed?;
        self.phase_done(Phase::ComputeInferences, started);
        self.state = SessionState::InferencesComputed;

        let stats = RunStats {
            processed: self.repo.processed(),
            active: self.repo.active(),
            inactive: self.repo.inactive(),
            axioms: self.repo.aggregate_len(),
            classified_concepts: 0,
            alerts: alerts.len(),
        };
        self.post_process_stage(stats).await
    }

    // ========================================================================
    // Shared stages
    // ========================================================================

    async fn post_process_stage(
        &mut self,
        stats: RunStats,
    ) -> Result<Arc<ClassificationResults>, SessionError> {
        let started = self.phase_start(Phase::PostProcess);
        let repo = Arc::clone(&self.repo);
        let reasoner = self.take_reasoner(Phase::PostProcess)?;
        let (reasoner, outcome) = tokio::task::spawn_blocking(move || {
            let outcome = post_process(reasoner.as_ref(), &repo, stats);
            (reasoner, outcome)
        })
        .await
        .map_err(|err| stage_error(Phase::PostProcess, &err))?;
        self.reasoner = Some(reasoner);
        let (results, alerts) = outcome?;
        self.raise_alerts(&alerts);
        self.phase_done(Phase::PostProcess, started);

        let results = Arc::new(results);
        self.results = Some(Arc::clone(&results));
        self.state = SessionState::ReadyForIncremental;
        self.handlers.emit(&ClassificationEvent::RunCompleted {
            stats: results.stats.clone(),
        });
        self.handlers.publish(&results);
        tracing::info!(
            concepts = results.stats.classified_concepts,
            axioms = results.stats.axioms,
            "classification run completed"
        );
        Ok(results)
    }

    fn take_reasoner(&mut self, phase: Phase) -> Result<Box<dyn Reasoner>, SessionError> {
        self.reasoner.take().ok_or(SessionError::Stage {
            phase,
            message: "reasoner unavailable after an earlier stage panic".to_string(),
        })
    }

    fn phase_start(&self, phase: Phase) -> Instant {
        tracing::info!(?phase, "stage started");
        self.handlers
            .emit(&ClassificationEvent::PhaseStarted { phase });
        Instant::now()
    }

    fn phase_done(&self, phase: Phase, started: Instant) {
        let elapsed = started.elapsed();
        tracing::info!(?phase, ?elapsed, "stage completed");
        self.handlers
            .emit(&ClassificationEvent::PhaseCompleted { phase, elapsed });
    }

    fn raise_alerts(&self, alerts: &[Alert]) {
        for alert in alerts {
            tracing::warn!(kind = ?alert.kind, concept = ?alert.concept, "{}", alert.message);
            self.handlers
                .emit(&ClassificationEvent::AlertRaised(alert.clone()));
        }
    }

    fn fail<T>(&mut self, err: SessionError) -> Result<T, SessionError> {
        self.state = SessionState::Failed;
        self.results = None;
        self.handlers.emit(&ClassificationEvent::RunFailed {
            message: err.to_string(),
        });
        tracing::error!("classification run failed: {err}");
        Err(err)
    }
}

fn stage_error(phase: Phase, err: &tokio::task::JoinError) -> SessionError {
    SessionError::Stage {
        phase,
        message: err.to_string(),
    }
}
