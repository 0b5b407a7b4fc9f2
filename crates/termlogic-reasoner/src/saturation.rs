//! In-memory EL saturation engine
//!
//! Classification in three steps: normalize the loaded axioms into EL normal
//! forms (introducing internal auxiliary atoms for compound expressions and
//! auxiliary roles for long chains), saturate subsumer sets with the EL
//! completion rules to a fixpoint, then reduce the subsumption preorder over
//! named classes to a direct taxonomy with equivalence groups. Auxiliary
//! atoms never escape: queries only ever see named classes plus the
//! universal top and bottom.

use crate::{Reasoner, ReasonerError};
use std::collections::{HashMap, HashSet};
use termlogic_axioms::{Axiom, AxiomDelta, ClassExpr, ClassSym, PropSym, BOTTOM, TOP};

type Atom = usize;
type RoleId = usize;

/// The one bundled `Reasoner` implementation.
#[derive(Debug, Default)]
pub struct ElReasoner {
    axioms: HashSet<Axiom>,
    taxonomy: Option<Taxonomy>,
    dirty: bool,
}

impl ElReasoner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reasoner for ElReasoner {
    fn load_ontology(&mut self, axioms: Vec<Axiom>) -> Result<(), ReasonerError> {
        self.axioms = axioms.into_iter().collect();
        self.taxonomy = None;
        self.dirty = true;
        Ok(())
    }

    fn apply_delta(&mut self, delta: &AxiomDelta) -> Result<(), ReasonerError> {
        for axiom in &delta.deletions {
            self.axioms.remove(axiom);
        }
        for axiom in &delta.additions {
            self.axioms.insert(axiom.clone());
        }
        self.dirty = true;
        Ok(())
    }

    fn classify(&mut self) -> Result<(), ReasonerError> {
        self.taxonomy = Some(Taxonomy::compute(&self.axioms));
        self.dirty = false;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ReasonerError> {
        if self.dirty || self.taxonomy.is_none() {
            self.classify()?;
        }
        Ok(())
    }

    fn direct_super_classes(&self, class: ClassSym) -> Result<Vec<ClassSym>, ReasonerError> {
        let taxonomy = self.taxonomy()?;
        if class == TOP {
            return Ok(Vec::new());
        }
        if class == BOTTOM {
            return Ok(taxonomy.leaves.clone());
        }
        Ok(match taxonomy.parents.get(&class) {
            Some(parents) if !parents.is_empty() => parents.clone(),
            _ => vec![TOP],
        })
    }

    fn direct_sub_classes(&self, class: ClassSym) -> Result<Vec<ClassSym>, ReasonerError> {
        let taxonomy = self.taxonomy()?;
        if class == TOP {
            return Ok(if taxonomy.roots.is_empty() {
                vec![BOTTOM]
            } else {
                taxonomy.roots.clone()
            });
        }
        if class == BOTTOM {
            return Ok(Vec::new());
        }
        Ok(match taxonomy.children.get(&class) {
            Some(children) if !children.is_empty() => children.clone(),
            _ => vec![BOTTOM],
        })
    }

    fn equivalent_classes(&self, class: ClassSym) -> Result<Vec<ClassSym>, ReasonerError> {
        let taxonomy = self.taxonomy()?;
        Ok(taxonomy.equivalents.get(&class).cloned().unwrap_or_default())
    }
}

impl ElReasoner {
    fn taxonomy(&self) -> Result<&Taxonomy, ReasonerError> {
        self.taxonomy
            .as_ref()
            .ok_or(ReasonerError::TaxonomyNotComputed)
    }
}

// ============================================================================
// Taxonomy
// ============================================================================

#[derive(Debug)]
struct Taxonomy {
    parents: HashMap<ClassSym, Vec<ClassSym>>,
    children: HashMap<ClassSym, Vec<ClassSym>>,
    equivalents: HashMap<ClassSym, Vec<ClassSym>>,
    /// Named classes directly under the universal top.
    roots: Vec<ClassSym>,
    /// Named classes directly above the universal bottom.
    leaves: Vec<ClassSym>,
}

impl Taxonomy {
    fn compute(axioms: &HashSet<Axiom>) -> Taxonomy {
        let normalized = Normalizer::run(axioms);
        let subsumers = saturate(&normalized);
        reduce(&normalized, &subsumers)
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Axioms rewritten into EL normal forms over dense atom / role indices.
struct Normalized {
    n_atoms: usize,
    n_roles: usize,
    top: Atom,
    /// Named classes and their atoms; auxiliary atoms are absent.
    named: Vec<(ClassSym, Atom)>,
    /// A1 ⊓ … ⊓ An ⊑ B
    told: Vec<(Vec<Atom>, Atom)>,
    /// A ⊑ ∃r.B
    rhs_exists: Vec<(Atom, RoleId, Atom)>,
    /// ∃r.A ⊑ B
    lhs_exists: Vec<(RoleId, Atom, Atom)>,
    /// r1 ∘ r2 ⊑ s
    chains: Vec<(RoleId, RoleId, RoleId)>,
    /// Reflexive-transitive super-role closure, per role.
    role_supers: Vec<Vec<RoleId>>,
}

struct Normalizer {
    atom_of_class: HashMap<ClassSym, Atom>,
    atom_of_expr: HashMap<ClassExpr, Atom>,
    role_of_prop: HashMap<PropSym, RoleId>,
    next_atom: usize,
    next_role: usize,
    top: Atom,
    told: Vec<(Vec<Atom>, Atom)>,
    rhs_exists: Vec<(Atom, RoleId, Atom)>,
    lhs_exists: Vec<(RoleId, Atom, Atom)>,
    chains: Vec<(RoleId, RoleId, RoleId)>,
    role_edges: Vec<(RoleId, RoleId)>,
}

impl Normalizer {
    fn run(axioms: &HashSet<Axiom>) -> Normalized {
        let mut n = Normalizer {
            atom_of_class: HashMap::new(),
            atom_of_expr: HashMap::new(),
            role_of_prop: HashMap::new(),
            next_atom: 1, // atom 0 is the universal top
            next_role: 0,
            top: 0,
            told: Vec::new(),
            rhs_exists: Vec::new(),
            lhs_exists: Vec::new(),
            chains: Vec::new(),
            role_edges: Vec::new(),
        };

        // Deterministic processing order keeps atom numbering stable.
        let mut ordered: Vec<&Axiom> = axioms.iter().collect();
        ordered.sort_by_key(|a| format!("{a:?}"));
        for axiom in ordered {
            n.normalize(axiom);
        }

        let named = n
            .atom_of_class
            .iter()
            .map(|(class, atom)| (*class, *atom))
            .collect();
        let role_supers = n.role_super_closure();

        Normalized {
            n_atoms: n.next_atom,
            n_roles: n.next_role,
            top: n.top,
            named,
            told: n.told,
            rhs_exists: n.rhs_exists,
            lhs_exists: n.lhs_exists,
            chains: n.chains,
            role_supers,
        }
    }

    fn normalize(&mut self, axiom: &Axiom) {
        match axiom {
            Axiom::SubClassOf { sub, sup } => {
                let a = self.define(sub);
                let b = self.define(sup);
                self.told.push((vec![a], b));
            }
            Axiom::EquivalentClasses { left, right } => {
                let a = self.define(left);
                let b = self.define(right);
                self.told.push((vec![a], b));
                self.told.push((vec![b], a));
            }
            Axiom::SubPropertyOf { sub, sup } => {
                let r = self.role(*sub);
                let s = self.role(*sup);
                self.role_edges.push((r, s));
            }
            Axiom::SubPropertyChainOf { chain, implied } => {
                let implied = self.role(*implied);
                let links: Vec<RoleId> = chain.iter().map(|p| self.role(*p)).collect();
                match links.as_slice() {
                    [] => {}
                    [only] => self.role_edges.push((*only, implied)),
                    _ => {
                        // Left-fold long chains into binary links through
                        // auxiliary roles.
                        let mut acc = links[0];
                        for (i, link) in links.iter().enumerate().skip(1) {
                            let target = if i == links.len() - 1 {
                                implied
                            } else {
                                self.fresh_role()
                            };
                            self.chains.push((acc, *link, target));
                            acc = target;
                        }
                    }
                }
            }
        }
    }

    /// Atom for an expression, introducing a definitional auxiliary atom for
    /// compound expressions: `aux ≡ expr`, split into normal forms.
    fn define(&mut self, expr: &ClassExpr) -> Atom {
        if let ClassExpr::Class(sym) = expr {
            return self.class_atom(*sym);
        }
        if let Some(atom) = self.atom_of_expr.get(expr) {
            return *atom;
        }
        let aux = self.fresh_atom();
        self.atom_of_expr.insert(expr.clone(), aux);
        match expr {
            ClassExpr::Class(_) => unreachable!("handled above"),
            ClassExpr::Intersection(parts) => {
                let part_atoms: Vec<Atom> = parts.iter().map(|p| self.define(p)).collect();
                self.told.push((part_atoms.clone(), aux));
                for part in part_atoms {
                    self.told.push((vec![aux], part));
                }
            }
            ClassExpr::Some { property, filler } => {
                let filler = self.define(filler);
                let role = self.role(*property);
                self.rhs_exists.push((aux, role, filler));
                self.lhs_exists.push((role, filler, aux));
            }
        }
        aux
    }

    fn class_atom(&mut self, sym: ClassSym) -> Atom {
        if let Some(atom) = self.atom_of_class.get(&sym) {
            return *atom;
        }
        let atom = self.fresh_atom();
        self.atom_of_class.insert(sym, atom);
        atom
    }

    fn role(&mut self, sym: PropSym) -> RoleId {
        if let Some(role) = self.role_of_prop.get(&sym) {
            return *role;
        }
        let role = self.fresh_role();
        self.role_of_prop.insert(sym, role);
        role
    }

    fn fresh_atom(&mut self) -> Atom {
        let atom = self.next_atom;
        self.next_atom += 1;
        atom
    }

    fn fresh_role(&mut self) -> RoleId {
        let role = self.next_role;
        self.next_role += 1;
        role
    }

    fn role_super_closure(&self) -> Vec<Vec<RoleId>> {
        let mut supers: Vec<HashSet<RoleId>> = (0..self.next_role)
            .map(|r| HashSet::from([r]))
            .collect();
        let mut changed = true;
        while changed {
            changed = false;
            for (sub, sup) in &self.role_edges {
                let to_add: Vec<RoleId> = supers[*sup].iter().copied().collect();
                for role in to_add {
                    if supers[*sub].insert(role) {
                        changed = true;
                    }
                }
            }
        }
        supers
            .into_iter()
            .map(|set| set.into_iter().collect())
            .collect()
    }
}

// ============================================================================
// Saturation
// ============================================================================

/// EL completion to a fixpoint: `subsumers[x]` ends up holding every atom
/// that subsumes `x`.
fn saturate(n: &Normalized) -> Vec<HashSet<Atom>> {
    let mut subsumers: Vec<HashSet<Atom>> = (0..n.n_atoms)
        .map(|atom| HashSet::from([atom, n.top]))
        .collect();
    let mut edges: Vec<HashSet<(Atom, Atom)>> = vec![HashSet::new(); n.n_roles];

    let mut changed = true;
    while changed {
        changed = false;

        // Conjunction rule: all of lhs subsumes x → rhs subsumes x.
        for (lhs, rhs) in &n.told {
            for x in 0..n.n_atoms {
                if subsumers[x].contains(rhs) {
                    continue;
                }
                if lhs.iter().all(|a| subsumers[x].contains(a)) {
                    subsumers[x].insert(*rhs);
                    changed = true;
                }
            }
        }

        // Existential introduction: a subsumes x, a ⊑ ∃r.b → edge x →r b.
        for (a, r, b) in &n.rhs_exists {
            for x in 0..n.n_atoms {
                if subsumers[x].contains(a) {
                    changed |= add_edge(&mut edges, &n.role_supers, *r, x, *b);
                }
            }
        }

        // Existential elimination: edge x →r y, a subsumes y, ∃r.a ⊑ b →
        // b subsumes x.
        for (r, a, b) in &n.lhs_exists {
            let pairs: Vec<(Atom, Atom)> = edges[*r].iter().copied().collect();
            for (x, y) in pairs {
                if subsumers[y].contains(a) && subsumers[x].insert(*b) {
                    changed = true;
                }
            }
        }

        // Chain rule: x →r1 y, y →r2 z, r1 ∘ r2 ⊑ s → x →s z.
        for (r1, r2, s) in &n.chains {
            let left: Vec<(Atom, Atom)> = edges[*r1].iter().copied().collect();
            let right: Vec<(Atom, Atom)> = edges[*r2].iter().copied().collect();
            for (x, y) in &left {
                for (y2, z) in &right {
                    if y2 == y {
                        changed |= add_edge(&mut edges, &n.role_supers, *s, *x, *z);
                    }
                }
            }
        }
    }

    subsumers
}

/// Insert an edge under every super-role of `r`.
fn add_edge(
    edges: &mut [HashSet<(Atom, Atom)>],
    role_supers: &[Vec<RoleId>],
    r: RoleId,
    x: Atom,
    y: Atom,
) -> bool {
    let mut added = false;
    for role in &role_supers[r] {
        added |= edges[*role].insert((x, y));
    }
    added
}

// ============================================================================
// Reduction to a direct taxonomy
// ============================================================================

fn reduce(n: &Normalized, subsumers: &[HashSet<Atom>]) -> Taxonomy {
    let atom_of: HashMap<ClassSym, Atom> = n.named.iter().copied().collect();
    let mut names: Vec<ClassSym> = atom_of.keys().copied().collect();
    names.sort_unstable();

    let strictly_below = |a: ClassSym, b: ClassSym| -> bool {
        let (aa, ba) = (atom_of[&a], atom_of[&b]);
        subsumers[aa].contains(&ba) && !subsumers[ba].contains(&aa)
    };
    let equivalent = |a: ClassSym, b: ClassSym| -> bool {
        let (aa, ba) = (atom_of[&a], atom_of[&b]);
        subsumers[aa].contains(&ba) && subsumers[ba].contains(&aa)
    };

    let mut parents: HashMap<ClassSym, Vec<ClassSym>> = HashMap::new();
    let mut children: HashMap<ClassSym, Vec<ClassSym>> = HashMap::new();
    let mut equivalents: HashMap<ClassSym, Vec<ClassSym>> = HashMap::new();

    for &class in &names {
        let equiv: Vec<ClassSym> = names
            .iter()
            .copied()
            .filter(|&other| other != class && equivalent(class, other))
            .collect();
        let strict: Vec<ClassSym> = names
            .iter()
            .copied()
            .filter(|&other| strictly_below(class, other))
            .collect();
        // Direct parents: strict subsumers with nothing strictly between.
        let direct: Vec<ClassSym> = strict
            .iter()
            .copied()
            .filter(|&p| !strict.iter().any(|&q| strictly_below(q, p)))
            .collect();

        equivalents.insert(class, equiv);
        parents.insert(class, direct);
    }

    for &class in &names {
        for parent in &parents[&class] {
            children.entry(*parent).or_default().push(class);
        }
        children.entry(class).or_default();
    }
    for list in children.values_mut() {
        list.sort_unstable();
    }

    let roots: Vec<ClassSym> = names
        .iter()
        .copied()
        .filter(|class| parents[class].is_empty())
        .collect();
    let leaves: Vec<ClassSym> = names
        .iter()
        .copied()
        .filter(|class| children[class].is_empty())
        .collect();

    Taxonomy {
        parents,
        children,
        equivalents,
        roots,
        leaves,
    }
}
