//! Formal axioms
//!
//! The EL fragment translation emits. Identity is structural: two axioms
//! with the same logical content compare and hash equal, so the repository's
//! aggregate set deduplicates across concepts for free.

use crate::symbols::{ClassSym, PropSym, SymbolTable};
use serde::{Deserialize, Serialize};

/// A class expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassExpr {
    /// A named class.
    Class(ClassSym),
    /// Intersection of two or more expressions.
    Intersection(Vec<ClassExpr>),
    /// Existential restriction: `property some filler`.
    Some {
        property: PropSym,
        filler: Box<ClassExpr>,
    },
}

impl ClassExpr {
    pub fn class(sym: ClassSym) -> Self {
        ClassExpr::Class(sym)
    }

    pub fn some(property: PropSym, filler: ClassExpr) -> Self {
        ClassExpr::Some {
            property,
            filler: Box::new(filler),
        }
    }

    fn render(&self, symbols: &SymbolTable) -> String {
        match self {
            ClassExpr::Class(sym) => symbols
                .class_iri(*sym)
                .unwrap_or_else(|| format!("<unmapped class {}>", sym.raw())),
            ClassExpr::Intersection(parts) => {
                let inner: Vec<String> = parts.iter().map(|p| p.render(symbols)).collect();
                format!("ObjectIntersectionOf({})", inner.join(" "))
            }
            ClassExpr::Some { property, filler } => format!(
                "ObjectSomeValuesFrom({} {})",
                render_prop(*property, symbols),
                filler.render(symbols)
            ),
        }
    }
}

/// A formal axiom in the classifier's representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axiom {
    SubClassOf { sub: ClassExpr, sup: ClassExpr },
    EquivalentClasses { left: ClassExpr, right: ClassExpr },
    SubPropertyOf { sub: PropSym, sup: PropSym },
    SubPropertyChainOf { chain: Vec<PropSym>, implied: PropSym },
}

impl Axiom {
    /// Functional-syntax rendering for diagnostics dumps.
    pub fn render(&self, symbols: &SymbolTable) -> String {
        match self {
            Axiom::SubClassOf { sub, sup } => {
                format!("SubClassOf({} {})", sub.render(symbols), sup.render(symbols))
            }
            Axiom::EquivalentClasses { left, right } => format!(
                "EquivalentClasses({} {})",
                left.render(symbols),
                right.render(symbols)
            ),
            Axiom::SubPropertyOf { sub, sup } => format!(
                "SubObjectPropertyOf({} {})",
                render_prop(*sub, symbols),
                render_prop(*sup, symbols)
            ),
            Axiom::SubPropertyChainOf { chain, implied } => {
                let links: Vec<String> =
                    chain.iter().map(|p| render_prop(*p, symbols)).collect();
                format!(
                    "SubObjectPropertyOf(ObjectPropertyChain({}) {})",
                    links.join(" "),
                    render_prop(*implied, symbols)
                )
            }
        }
    }
}

fn render_prop(sym: PropSym, symbols: &SymbolTable) -> String {
    symbols
        .prop_iri(sym)
        .unwrap_or_else(|| format!("<unmapped property {}>", sym.raw()))
}

/// The difference between a concept's previous and current axiom sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxiomDelta {
    pub additions: Vec<Axiom>,
    pub deletions: Vec<Axiom>,
}

impl AxiomDelta {
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.deletions.is_empty()
    }

    /// Fold another delta into this one.
    pub fn merge(&mut self, other: AxiomDelta) {
        self.additions.extend(other.additions);
        self.deletions.extend(other.deletions);
    }
}
