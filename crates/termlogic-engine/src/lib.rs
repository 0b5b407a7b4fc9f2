//! Termlogic engine: classification orchestration
//!
//! Sequences the classification pipeline over the repository and the
//! reasoner boundary:
//!
//! - **Full run**: extract every active concept's definition in parallel,
//!   load the aggregate axiom set into a fresh reasoner ontology, compute
//!   inferences, post-process the taxonomy back into nid space.
//! - **Incremental run**: re-translate the edited definitions, diff against
//!   the recorded sets, apply the batched delta to the live ontology, flush
//!   once, post-process.
//!
//! A `ClassificationSession` owns the repository and the reasoner for the
//! duration of a reasoning session and walks an explicit state machine;
//! there is no process-wide singleton. Progress, alerts, and stage timings
//! surface through registered event handlers, and per-concept problems are
//! contained as `Alert` values — one bad definition never aborts a batch.

pub mod diagnostics;
pub mod extract;
pub mod incremental;
pub mod results;
pub mod session;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use termlogic_axioms::{RepositoryError, TranslateError};
use termlogic_model::Nid;

pub use diagnostics::{dump_repository, dump_results};
pub use extract::{extract_all, ExtractionSummary};
pub use incremental::process_incremental;
pub use results::{post_process, ClassificationResults, RunStats};
pub use session::{ClassificationSession, SessionConfig, SessionError, SessionState};

// ============================================================================
// Alerts
// ============================================================================

/// What kind of contained, per-concept problem occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    /// A definition tree violated a structural invariant.
    MalformedDefinition,
    /// A recognized construct translation does not support.
    UnsupportedConstruct,
    /// A concept's axioms were recorded twice during one extraction.
    DuplicateDefinition,
    /// A semantic had no definition tree behind it.
    MissingDefinition,
    /// A classifier symbol could not be mapped back to a nid.
    SymbolResolution,
}

/// A contained problem report. Alerts are dispatched through event handlers
/// and collected into run summaries; they never abort sibling concepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub concept: Option<Nid>,
    pub message: String,
}

impl Alert {
    pub fn missing_definition(concept: Nid, semantic: Nid) -> Self {
        Alert {
            kind: AlertKind::MissingDefinition,
            concept: Some(concept),
            message: format!("semantic {semantic} has no definition tree"),
        }
    }

    pub fn symbol_resolution(concept: Nid, symbol_text: impl Into<String>) -> Self {
        Alert {
            kind: AlertKind::SymbolResolution,
            concept: Some(concept),
            message: format!(
                "cannot map classifier symbol back to a nid: {}",
                symbol_text.into()
            ),
        }
    }
}

impl From<TranslateError> for Alert {
    fn from(err: TranslateError) -> Self {
        let (kind, concept) = match &err {
            TranslateError::Malformed { concept, .. } => {
                (AlertKind::MalformedDefinition, *concept)
            }
            TranslateError::Unsupported { concept, .. } => {
                (AlertKind::UnsupportedConstruct, *concept)
            }
        };
        Alert {
            kind,
            concept: Some(concept),
            message: err.to_string(),
        }
    }
}

impl From<RepositoryError> for Alert {
    fn from(err: RepositoryError) -> Self {
        let RepositoryError::DuplicateDefinition { concept } = &err;
        Alert {
            kind: AlertKind::DuplicateDefinition,
            concept: Some(*concept),
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Events
// ============================================================================

/// Pipeline stage names, for events and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Extract,
    Load,
    ComputeInferences,
    ApplyDeltas,
    PostProcess,
}

/// Events emitted while a run executes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassificationEvent {
    PhaseStarted {
        phase: Phase,
    },
    PhaseCompleted {
        phase: Phase,
        elapsed: Duration,
    },
    /// Coarse progress through extraction, reported at intervals rather
    /// than per item.
    Progress {
        processed: usize,
        total: usize,
    },
    AlertRaised(Alert),
    RunCompleted {
        stats: RunStats,
    },
    RunFailed {
        message: String,
    },
}

/// Callback for classification events.
pub type EventHandler = Box<dyn Fn(&ClassificationEvent) + Send + Sync>;

/// Callback invoked with the results of each completed run.
pub type ResultsConsumer = Box<dyn Fn(&ClassificationResults) + Send + Sync>;
