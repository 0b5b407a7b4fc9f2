//! Definition-tree translation
//!
//! Walks one concept's stated-definition tree and emits the minimal axiom
//! set that reproduces its semantics. Translation is pure apart from lazy
//! symbol creation in the repository, and it is all-or-nothing per concept:
//! an error leaves nothing recorded.

use crate::axiom::{Axiom, ClassExpr};
use crate::repository::AxiomRepository;
use std::collections::HashSet;
use termlogic_model::{DefinitionTree, LogicalVertex, Nid, RoleOperator};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranslateError {
    /// The tree violates a structural invariant: wrong child cardinality or
    /// an unexpected vertex meaning where a specific one is required. Bad
    /// data; fail fast rather than guess.
    #[error("malformed definition for concept {concept}: {detail}")]
    Malformed { concept: Nid, detail: String },

    /// A recognized logical construct the translation deliberately does not
    /// handle. A known capability gap, distinct from malformed input.
    #[error("unsupported logical construct {construct} in definition of concept {concept}")]
    Unsupported {
        concept: Nid,
        construct: &'static str,
    },
}

impl TranslateError {
    fn malformed(concept: Nid, detail: impl Into<String>) -> Self {
        TranslateError::Malformed {
            concept,
            detail: detail.into(),
        }
    }
}

/// Translate one concept's definition tree into its axiom set.
///
/// Symbol creation through the repository is memoized and idempotent, so
/// repeated translation of the same tree yields structurally equal sets.
pub fn translate_definition(
    tree: &DefinitionTree,
    concept: Nid,
    repo: &AxiomRepository,
) -> Result<HashSet<Axiom>, TranslateError> {
    let mut axioms = HashSet::new();
    let concept_class = ClassExpr::Class(repo.class_sym(concept));

    for set_vertex in &tree.root_sets {
        match set_vertex {
            LogicalVertex::SufficientSet { children } => {
                let expr = conjoined_expression(children, concept, repo, "SUFFICIENT_SET")?;
                axioms.insert(Axiom::EquivalentClasses {
                    left: concept_class.clone(),
                    right: expr,
                });
            }
            LogicalVertex::NecessarySet { children } => {
                let expr = conjoined_expression(children, concept, repo, "NECESSARY_SET")?;
                axioms.insert(Axiom::SubClassOf {
                    sub: concept_class.clone(),
                    sup: expr,
                });
            }
            LogicalVertex::PropertySet { children } => {
                translate_property_set(children, concept, repo, &mut axioms)?;
            }
            other => {
                return Err(TranslateError::malformed(
                    concept,
                    format!(
                        "{} directly under definition root; expected a set vertex",
                        other.meaning()
                    ),
                ));
            }
        }
    }

    Ok(axioms)
}

/// A set vertex must wrap exactly one AND child; translate that AND subtree.
fn conjoined_expression(
    children: &[LogicalVertex],
    concept: Nid,
    repo: &AxiomRepository,
    set_kind: &str,
) -> Result<ClassExpr, TranslateError> {
    match children {
        [LogicalVertex::And { children }] => and_expression(children, concept, repo),
        [other] => Err(TranslateError::malformed(
            concept,
            format!("{set_kind} child is {}; expected AND", other.meaning()),
        )),
        [] => Err(TranslateError::malformed(
            concept,
            format!("{set_kind} has no children; expected exactly one AND"),
        )),
        many => Err(TranslateError::malformed(
            concept,
            format!(
                "{set_kind} has {} children; expected exactly one AND",
                many.len()
            ),
        )),
    }
}

/// AND with one child collapses to that child's expression; more children
/// become an intersection.
fn and_expression(
    children: &[LogicalVertex],
    concept: Nid,
    repo: &AxiomRepository,
) -> Result<ClassExpr, TranslateError> {
    match children {
        [] => Err(TranslateError::malformed(concept, "AND has no children")),
        [single] => expression(single, concept, repo),
        many => {
            let parts = many
                .iter()
                .map(|child| expression(child, concept, repo))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ClassExpr::Intersection(parts))
        }
    }
}

fn expression(
    vertex: &LogicalVertex,
    concept: Nid,
    repo: &AxiomRepository,
) -> Result<ClassExpr, TranslateError> {
    match vertex {
        LogicalVertex::And { children } => and_expression(children, concept, repo),
        LogicalVertex::Concept { concept: referenced } => {
            Ok(ClassExpr::Class(repo.class_sym(*referenced)))
        }
        LogicalVertex::Role {
            role_type,
            operator,
            children,
        } => match operator {
            RoleOperator::Existential => match children.as_slice() {
                [filler] => Ok(ClassExpr::some(
                    repo.prop_sym(*role_type),
                    expression(filler, concept, repo)?,
                )),
                other => Err(TranslateError::malformed(
                    concept,
                    format!(
                        "existential ROLE has {} children; expected exactly one restriction",
                        other.len()
                    ),
                )),
            },
            RoleOperator::Universal => Err(TranslateError::Unsupported {
                concept,
                construct: "universal role restriction",
            }),
        },
        LogicalVertex::Or { .. } => Err(TranslateError::Unsupported {
            concept,
            construct: "OR",
        }),
        LogicalVertex::Feature { .. } => Err(TranslateError::Unsupported {
            concept,
            construct: "FEATURE",
        }),
        LogicalVertex::DisjointWith { .. } => Err(TranslateError::Unsupported {
            concept,
            construct: "DISJOINT_WITH",
        }),
        LogicalVertex::SufficientSet { .. }
        | LogicalVertex::NecessarySet { .. }
        | LogicalVertex::PropertySet { .. }
        | LogicalVertex::PropertyPatternImplication { .. } => Err(TranslateError::malformed(
            concept,
            format!("{} nested inside an expression", vertex.meaning()),
        )),
    }
}

/// A property set's single AND child lists role-hierarchy statements: plain
/// concept references become sub-property axioms for the concept's own role
/// symbol; pattern implications become property chains.
fn translate_property_set(
    children: &[LogicalVertex],
    concept: Nid,
    repo: &AxiomRepository,
    axioms: &mut HashSet<Axiom>,
) -> Result<(), TranslateError> {
    let statements = match children {
        [LogicalVertex::And { children }] => children,
        [other] => {
            return Err(TranslateError::malformed(
                concept,
                format!("PROPERTY_SET child is {}; expected AND", other.meaning()),
            ))
        }
        _ => {
            return Err(TranslateError::malformed(
                concept,
                format!(
                    "PROPERTY_SET has {} children; expected exactly one AND",
                    children.len()
                ),
            ))
        }
    };

    for statement in statements {
        match statement {
            LogicalVertex::Concept {
                concept: super_role,
            } => {
                axioms.insert(Axiom::SubPropertyOf {
                    sub: repo.prop_sym(concept),
                    sup: repo.prop_sym(*super_role),
                });
            }
            LogicalVertex::PropertyPatternImplication {
                pattern,
                implication,
            } => {
                if pattern.is_empty() {
                    return Err(TranslateError::malformed(
                        concept,
                        "PROPERTY_PATTERN_IMPLICATION has an empty pattern",
                    ));
                }
                axioms.insert(Axiom::SubPropertyChainOf {
                    chain: pattern.iter().map(|role| repo.prop_sym(*role)).collect(),
                    implied: repo.prop_sym(*implication),
                });
            }
            other => {
                return Err(TranslateError::malformed(
                    concept,
                    format!(
                        "{} inside PROPERTY_SET; expected CONCEPT or PROPERTY_PATTERN_IMPLICATION",
                        other.meaning()
                    ),
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use termlogic_model::LogicalVertex as V;

    const CONCEPT: Nid = Nid::new(-100);
    const B: Nid = Nid::new(-200);
    const C: Nid = Nid::new(-300);
    const R: Nid = Nid::new(-400);

    #[test]
    fn necessary_set_emits_subclass_of() {
        let repo = AxiomRepository::new();
        let tree = DefinitionTree::necessary(vec![V::concept(B)]);
        let axioms = translate_definition(&tree, CONCEPT, &repo).unwrap();

        let expected = Axiom::SubClassOf {
            sub: ClassExpr::Class(repo.class_sym(CONCEPT)),
            sup: ClassExpr::Class(repo.class_sym(B)),
        };
        assert_eq!(axioms.len(), 1);
        assert!(axioms.contains(&expected));
    }

    #[test]
    fn sufficient_set_emits_equivalent_classes() {
        let repo = AxiomRepository::new();
        let tree = DefinitionTree::sufficient(vec![V::concept(B)]);
        let axioms = translate_definition(&tree, CONCEPT, &repo).unwrap();

        let expected = Axiom::EquivalentClasses {
            left: ClassExpr::Class(repo.class_sym(CONCEPT)),
            right: ClassExpr::Class(repo.class_sym(B)),
        };
        assert_eq!(axioms.len(), 1);
        assert!(axioms.contains(&expected));
    }

    #[test]
    fn single_child_and_collapses() {
        let repo = AxiomRepository::new();
        let tree = DefinitionTree::necessary(vec![V::concept(B)]);
        let axioms = translate_definition(&tree, CONCEPT, &repo).unwrap();

        // The right-hand side is the bare class, not a one-element intersection.
        match axioms.into_iter().next().unwrap() {
            Axiom::SubClassOf { sup, .. } => {
                assert_eq!(sup, ClassExpr::Class(repo.class_sym(B)));
            }
            other => panic!("expected SubClassOf, got {other:?}"),
        }
    }

    #[test]
    fn multi_child_and_becomes_intersection() {
        let repo = AxiomRepository::new();
        let tree = DefinitionTree::necessary(vec![V::concept(B), V::concept(C)]);
        let axioms = translate_definition(&tree, CONCEPT, &repo).unwrap();

        match axioms.into_iter().next().unwrap() {
            Axiom::SubClassOf { sup, .. } => match sup {
                ClassExpr::Intersection(parts) => assert_eq!(parts.len(), 2),
                other => panic!("expected intersection, got {other:?}"),
            },
            other => panic!("expected SubClassOf, got {other:?}"),
        }
    }

    #[test]
    fn existential_role_translates_to_some_values_from() {
        let repo = AxiomRepository::new();
        let tree = DefinitionTree::necessary(vec![V::some(R, V::concept(C))]);
        let axioms = translate_definition(&tree, CONCEPT, &repo).unwrap();

        let expected = Axiom::SubClassOf {
            sub: ClassExpr::Class(repo.class_sym(CONCEPT)),
            sup: ClassExpr::some(repo.prop_sym(R), ClassExpr::Class(repo.class_sym(C))),
        };
        assert!(axioms.contains(&expected));
    }

    #[test]
    fn translation_is_deterministic_across_fresh_repositories() {
        let tree = DefinitionTree::necessary(vec![
            V::concept(B),
            V::some(R, V::and(vec![V::concept(C), V::concept(B)])),
        ]);
        let first = translate_definition(&tree, CONCEPT, &AxiomRepository::new()).unwrap();
        let second = translate_definition(&tree, CONCEPT, &AxiomRepository::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn sufficient_set_without_and_child_is_malformed() {
        let repo = AxiomRepository::new();
        let tree = DefinitionTree::new(vec![V::SufficientSet {
            children: vec![V::concept(B)],
        }]);
        let err = translate_definition(&tree, CONCEPT, &repo).unwrap_err();
        assert!(matches!(err, TranslateError::Malformed { concept, .. } if concept == CONCEPT));
    }

    #[test]
    fn sufficient_set_with_two_children_is_malformed() {
        let repo = AxiomRepository::new();
        let tree = DefinitionTree::new(vec![V::SufficientSet {
            children: vec![V::and(vec![V::concept(B)]), V::and(vec![V::concept(C)])],
        }]);
        assert!(matches!(
            translate_definition(&tree, CONCEPT, &repo),
            Err(TranslateError::Malformed { .. })
        ));
    }

    #[test]
    fn or_is_reported_unsupported_not_malformed() {
        let repo = AxiomRepository::new();
        let tree = DefinitionTree::necessary(vec![V::Or {
            children: vec![V::concept(B), V::concept(C)],
        }]);
        let err = translate_definition(&tree, CONCEPT, &repo).unwrap_err();
        assert_eq!(
            err,
            TranslateError::Unsupported {
                concept: CONCEPT,
                construct: "OR"
            }
        );
    }

    #[test]
    fn universal_role_operator_is_unsupported() {
        let repo = AxiomRepository::new();
        let tree = DefinitionTree::necessary(vec![V::Role {
            role_type: R,
            operator: termlogic_model::RoleOperator::Universal,
            children: vec![V::concept(C)],
        }]);
        assert!(matches!(
            translate_definition(&tree, CONCEPT, &repo),
            Err(TranslateError::Unsupported {
                construct: "universal role restriction",
                ..
            })
        ));
    }

    #[test]
    fn property_set_emits_role_hierarchy_axioms() {
        let repo = AxiomRepository::new();
        let implied = Nid::new(-500);
        let tree = DefinitionTree::new(vec![V::PropertySet {
            children: vec![V::and(vec![
                V::concept(B),
                V::PropertyPatternImplication {
                    pattern: vec![R, B],
                    implication: implied,
                },
            ])],
        }]);
        let axioms = translate_definition(&tree, CONCEPT, &repo).unwrap();

        assert!(axioms.contains(&Axiom::SubPropertyOf {
            sub: repo.prop_sym(CONCEPT),
            sup: repo.prop_sym(B),
        }));
        assert!(axioms.contains(&Axiom::SubPropertyChainOf {
            chain: vec![repo.prop_sym(R), repo.prop_sym(B)],
            implied: repo.prop_sym(implied),
        }));
    }
}
