//! Termlogic model: logical-expression trees and the terminology-store boundary
//!
//! A concept's stated definition arrives from the terminology store as a
//! directed tree of typed logical vertices (conjunctions, concept references,
//! existential role restrictions, and the definition-root set vertices that
//! partition necessary from sufficient conditions). This crate defines that
//! tree as a closed sum type, the native identifier space (`Nid`), and the
//! narrow trait the classification pipeline uses to read definitions out of
//! whatever store hosts them.
//!
//! The store itself (entities, semantics, patterns, versioning) is an
//! external collaborator. `MemoryStore` is the in-memory implementation used
//! by tests and by embedders that stage definitions programmatically.

pub mod expression;
pub mod store;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use expression::{DefinitionTree, LogicalVertex, RoleOperator};
pub use store::{MemoryStore, StatedSemantic, TerminologyStore};

// ============================================================================
// Native Identifiers
// ============================================================================

/// Native terminology identifier: a compact integer surrogate key.
///
/// Everything the pipeline touches — concepts, roles, semantics, patterns —
/// is addressed by nid. Nids are opaque; ordering is only used to make
/// result sets deterministic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct Nid(i32);

impl Nid {
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Nid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Nid {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}
