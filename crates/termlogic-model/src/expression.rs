//! Logical-expression trees
//!
//! One tree per concept per premise type, rooted at an (implicit) definition
//! root whose direct children are the set vertices. The tree is data, not an
//! invariant-bearing structure: wrong child counts and unsupported constructs
//! are representable on purpose, so that translation can detect and report
//! them instead of the type system masking bad upstream content.

use crate::Nid;
use serde::{Deserialize, Serialize};

/// Operator attached to a role restriction vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleOperator {
    /// "Some values from" — the only operator translation supports.
    Existential,
    /// "All values from" — recognized but not translatable.
    Universal,
}

/// A vertex in a concept's stated-definition tree.
///
/// The enumeration is closed: every meaning the upstream store can attach to
/// a vertex has a variant here, including the ones translation rejects
/// (`Or`, `Feature`, `DisjointWith`). Matching exhaustively is the point —
/// an unhandled construct is a compile error, not a runtime surprise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogicalVertex {
    /// Conjunction of child expressions.
    And { children: Vec<LogicalVertex> },
    /// Disjunction. Present in the meaning vocabulary, never translatable.
    Or { children: Vec<LogicalVertex> },
    /// Reference to another concept.
    Concept { concept: Nid },
    /// Role restriction: `operator` over `role_type` with one child filler.
    Role {
        role_type: Nid,
        operator: RoleOperator,
        children: Vec<LogicalVertex>,
    },
    /// Concrete-domain feature. Present in the vocabulary, never translatable.
    Feature { feature_type: Nid, value: f64 },
    /// Root set: the conjoined children are sufficient for concept membership.
    SufficientSet { children: Vec<LogicalVertex> },
    /// Root set: the conjoined children are necessary for concept membership.
    NecessarySet { children: Vec<LogicalVertex> },
    /// Root set: role-hierarchy statements about the concept itself.
    PropertySet { children: Vec<LogicalVertex> },
    /// A role chain `pattern` implying the role `implication`.
    PropertyPatternImplication { pattern: Vec<Nid>, implication: Nid },
    /// Disjointness statement. Present in the vocabulary, never translatable.
    DisjointWith { concept: Nid },
}

impl LogicalVertex {
    /// Short tag used in diagnostics and alert messages.
    pub fn meaning(&self) -> &'static str {
        match self {
            LogicalVertex::And { .. } => "AND",
            LogicalVertex::Or { .. } => "OR",
            LogicalVertex::Concept { .. } => "CONCEPT",
            LogicalVertex::Role { .. } => "ROLE",
            LogicalVertex::Feature { .. } => "FEATURE",
            LogicalVertex::SufficientSet { .. } => "SUFFICIENT_SET",
            LogicalVertex::NecessarySet { .. } => "NECESSARY_SET",
            LogicalVertex::PropertySet { .. } => "PROPERTY_SET",
            LogicalVertex::PropertyPatternImplication { .. } => "PROPERTY_PATTERN_IMPLICATION",
            LogicalVertex::DisjointWith { .. } => "DISJOINT_WITH",
        }
    }

    /// Conjunction over `children`.
    pub fn and(children: Vec<LogicalVertex>) -> Self {
        LogicalVertex::And { children }
    }

    /// Reference to `concept`.
    pub fn concept(concept: Nid) -> Self {
        LogicalVertex::Concept { concept }
    }

    /// Existential restriction `role_type some filler`.
    pub fn some(role_type: Nid, filler: LogicalVertex) -> Self {
        LogicalVertex::Role {
            role_type,
            operator: RoleOperator::Existential,
            children: vec![filler],
        }
    }
}

/// One concept's stated definition: the direct children of the definition
/// root. Immutable once built; the classification core only reads it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DefinitionTree {
    pub root_sets: Vec<LogicalVertex>,
}

impl DefinitionTree {
    pub fn new(root_sets: Vec<LogicalVertex>) -> Self {
        Self { root_sets }
    }

    /// A definition with a single necessary set conjoining `conjuncts`.
    pub fn necessary(conjuncts: Vec<LogicalVertex>) -> Self {
        Self::new(vec![LogicalVertex::NecessarySet {
            children: vec![LogicalVertex::and(conjuncts)],
        }])
    }

    /// A definition with a single sufficient set conjoining `conjuncts`.
    pub fn sufficient(conjuncts: Vec<LogicalVertex>) -> Self {
        Self::new(vec![LogicalVertex::SufficientSet {
            children: vec![LogicalVertex::and(conjuncts)],
        }])
    }
}
