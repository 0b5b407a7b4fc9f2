//! Termlogic axioms: formal axioms, symbol interning, and the axiom repository
//!
//! The bridge between the terminology's nid space and the classifier's
//! symbol space:
//!
//! 1. **Symbols** — interned class/property symbols, one per nid per session,
//!    created lazily and memoized so concurrent extraction workers always
//!    agree on the mapping.
//! 2. **Axioms** — the EL fragment the translator can emit: subclass-of,
//!    equivalent-classes, sub-property-of, sub-property-chain-of, over class
//!    expressions built from named classes, intersections, and existential
//!    restrictions. Identity is structural.
//! 3. **Repository** — per-concept recorded axiom sets, an ownership-counted
//!    aggregate set (the classifier's input), counters, and the frozen
//!    classification universe. Safe for parallel population.
//! 4. **Translation** — one concept's definition tree to its axiom set, with
//!    malformed input and unsupported constructs reported as distinct
//!    errors.

pub mod axiom;
pub mod repository;
pub mod symbols;
pub mod translate;

pub use axiom::{Axiom, AxiomDelta, ClassExpr};
pub use repository::{AxiomRepository, RepositoryError};
pub use symbols::{ClassSym, PropSym, SymbolTable, BOTTOM, TOP};
pub use translate::{translate_definition, TranslateError};
