//! Symbol interning
//!
//! Classifier-native symbols are compact interned ids backed by IRI text.
//! The IRI's local name is the decimal nid, which is what lets result
//! post-processing map symbols back to native identifiers without a reverse
//! table — and what makes a foreign symbol (one the session never minted)
//! detectable as a data-integrity problem.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use termlogic_model::Nid;

const CONCEPT_IRI_BASE: &str = "http://termlogic.io/concept#";
const ROLE_IRI_BASE: &str = "http://termlogic.io/role#";
const TOP_IRI: &str = "http://www.w3.org/2002/07/owl#Thing";
const BOTTOM_IRI: &str = "http://www.w3.org/2002/07/owl#Nothing";

/// Interned class symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ClassSym(u32);

impl ClassSym {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Interned property symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PropSym(u32);

impl PropSym {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// The universal top class. Carries no terminology meaning.
pub const TOP: ClassSym = ClassSym(0);
/// The universal bottom class. Carries no terminology meaning.
pub const BOTTOM: ClassSym = ClassSym(1);

/// Thread-safe nid → symbol interner.
///
/// Creation is lazy, memoized, and atomic per nid: two workers racing to
/// resolve the same concept always observe the same symbol. Symbols 0 and 1
/// are reserved for top and bottom.
#[derive(Debug)]
pub struct SymbolTable {
    class_by_nid: DashMap<Nid, ClassSym>,
    prop_by_nid: DashMap<Nid, PropSym>,
    class_iris: DashMap<ClassSym, String>,
    prop_iris: DashMap<PropSym, String>,
    next_class: AtomicU32,
    next_prop: AtomicU32,
}

impl SymbolTable {
    pub fn new() -> Self {
        let class_iris = DashMap::new();
        class_iris.insert(TOP, TOP_IRI.to_string());
        class_iris.insert(BOTTOM, BOTTOM_IRI.to_string());
        Self {
            class_by_nid: DashMap::new(),
            prop_by_nid: DashMap::new(),
            class_iris,
            prop_iris: DashMap::new(),
            next_class: AtomicU32::new(2),
            next_prop: AtomicU32::new(0),
        }
    }

    /// The class symbol for `concept`, minting it on first use.
    pub fn class_sym(&self, concept: Nid) -> ClassSym {
        *self.class_by_nid.entry(concept).or_insert_with(|| {
            let sym = ClassSym(self.next_class.fetch_add(1, Ordering::SeqCst));
            self.class_iris
                .insert(sym, format!("{CONCEPT_IRI_BASE}{}", concept.raw()));
            sym
        })
    }

    /// The property symbol for `role`, minting it on first use.
    pub fn prop_sym(&self, role: Nid) -> PropSym {
        *self.prop_by_nid.entry(role).or_insert_with(|| {
            let sym = PropSym(self.next_prop.fetch_add(1, Ordering::SeqCst));
            self.prop_iris
                .insert(sym, format!("{ROLE_IRI_BASE}{}", role.raw()));
            sym
        })
    }

    /// Mint a class symbol for an IRI outside the nid space. Exists for the
    /// sake of collaborators that inject classes of their own; such symbols
    /// surface as symbol-resolution alerts during post-processing.
    pub fn foreign_class(&self, iri: &str) -> ClassSym {
        let sym = ClassSym(self.next_class.fetch_add(1, Ordering::SeqCst));
        self.class_iris.insert(sym, iri.to_string());
        sym
    }

    pub fn class_iri(&self, sym: ClassSym) -> Option<String> {
        self.class_iris.get(&sym).map(|s| s.clone())
    }

    pub fn prop_iri(&self, sym: PropSym) -> Option<String> {
        self.prop_iris.get(&sym).map(|s| s.clone())
    }

    /// Snapshot of every nid ↔ class-symbol pair minted so far.
    pub fn classes(&self) -> Vec<(Nid, ClassSym)> {
        self.class_by_nid.iter().map(|e| (*e.key(), *e.value())).collect()
    }

    /// Snapshot of every nid ↔ property-symbol pair minted so far.
    pub fn properties(&self) -> Vec<(Nid, PropSym)> {
        self.prop_by_nid.iter().map(|e| (*e.key(), *e.value())).collect()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// The last path segment of an IRI.
pub fn local_name(iri: &str) -> &str {
    iri.rsplit(['/', '#']).next().unwrap_or(iri)
}

/// Parse an IRI's local name back into a nid, if it is one.
pub fn parse_nid(iri: &str) -> Option<Nid> {
    local_name(iri).parse::<i32>().ok().map(Nid::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_symbols_are_memoized() {
        let table = SymbolTable::new();
        let a = table.class_sym(Nid::new(-5));
        let b = table.class_sym(Nid::new(-5));
        let c = table.class_sym(Nid::new(-6));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn symbols_never_collide_with_top_or_bottom() {
        let table = SymbolTable::new();
        let sym = table.class_sym(Nid::new(1));
        assert_ne!(sym, TOP);
        assert_ne!(sym, BOTTOM);
    }

    #[test]
    fn concurrent_interning_agrees_on_one_symbol() {
        let table = SymbolTable::new();
        let syms: Vec<ClassSym> = std::thread::scope(|scope| {
            (0..8)
                .map(|_| scope.spawn(|| table.class_sym(Nid::new(99))))
                .collect::<Vec<_>>()
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect()
        });
        assert!(syms.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn iri_local_name_round_trips_the_nid() {
        let table = SymbolTable::new();
        let sym = table.class_sym(Nid::new(-2147));
        let iri = table.class_iri(sym).unwrap();
        assert_eq!(parse_nid(&iri), Some(Nid::new(-2147)));
        assert_eq!(parse_nid(TOP_IRI), None);
    }
}
