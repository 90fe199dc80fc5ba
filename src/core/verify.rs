//! core::verify
//!
//! Fast verification of hierarchy invariants.
//!
//! # Checks
//!
//! - Roots are countries with no parent
//! - Every child's `parent_id` points back at the node that lists it
//! - Child kind is below parent kind (moves may skip levels)
//! - Every node is reachable from exactly one root, exactly once
//!
//! # Invariants
//!
//! - Never mutates the tree
//! - Must be deterministic

use std::collections::HashMap;

use super::tree::HierarchyTree;
use super::types::NodeId;
use thiserror::Error;

/// Errors from verification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("root '{0}' is not a country")]
    RootNotCountry(String),

    #[error("root '{0}' has a parent pointer")]
    RootHasParent(String),

    #[error("'{child}' is listed under '{listed_by}' but points at {points_to}")]
    ParentMismatch {
        child: String,
        listed_by: String,
        points_to: String,
    },

    #[error("'{child}' ({child_kind}) is not below '{parent}' ({parent_kind})")]
    LevelInversion {
        child: String,
        child_kind: String,
        parent: String,
        parent_kind: String,
    },

    #[error("'{0}' is listed but missing from the tree")]
    DanglingChild(String),

    #[error("'{0}' is reachable more than once (shared ownership or cycle)")]
    SharedOwnership(String),

    #[error("'{0}' is not reachable from any root")]
    Orphan(String),
}

/// Result of fast verification.
#[derive(Debug)]
pub struct VerifyResult {
    /// Whether verification passed
    pub ok: bool,
    /// Errors found during verification
    pub errors: Vec<VerifyError>,
}

impl VerifyResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            ok: true,
            errors: vec![],
        }
    }

    /// Create a failed result with errors.
    pub fn failure(errors: Vec<VerifyError>) -> Self {
        Self { ok: false, errors }
    }
}

/// Perform fast verification of the hierarchy.
pub fn fast_verify(tree: &HierarchyTree) -> VerifyResult {
    let mut errors = Vec::new();
    let mut seen: HashMap<&NodeId, usize> = HashMap::new();

    let mut stack: Vec<&NodeId> = Vec::new();
    for root_id in tree.root_ids() {
        match tree.find_node(root_id) {
            Some(root) => {
                if root.kind.parent_kind().is_some() {
                    errors.push(VerifyError::RootNotCountry(root_id.to_string()));
                }
                if root.parent_id.is_some() {
                    errors.push(VerifyError::RootHasParent(root_id.to_string()));
                }
                stack.push(root_id);
            }
            None => errors.push(VerifyError::DanglingChild(root_id.to_string())),
        }
    }

    while let Some(id) = stack.pop() {
        let visits = seen.entry(id).or_insert(0);
        *visits += 1;
        if *visits > 1 {
            errors.push(VerifyError::SharedOwnership(id.to_string()));
            // Do not descend again; a cycle would never terminate.
            continue;
        }

        let Some(node) = tree.find_node(id) else {
            continue;
        };
        for child_id in node.children() {
            let Some(child) = tree.find_node(child_id) else {
                errors.push(VerifyError::DanglingChild(child_id.to_string()));
                continue;
            };
            if child.parent_id.as_ref() != Some(id) {
                errors.push(VerifyError::ParentMismatch {
                    child: child_id.to_string(),
                    listed_by: id.to_string(),
                    points_to: child
                        .parent_id
                        .as_ref()
                        .map_or_else(|| "nothing".to_string(), |p| format!("'{p}'")),
                });
            }
            if child.kind.depth() <= node.kind.depth() {
                errors.push(VerifyError::LevelInversion {
                    child: child_id.to_string(),
                    child_kind: child.kind.to_string(),
                    parent: id.to_string(),
                    parent_kind: node.kind.to_string(),
                });
            }
            stack.push(child_id);
        }
    }

    let mut orphans: Vec<_> = tree
        .nodes()
        .filter(|n| !seen.contains_key(&n.id))
        .map(|n| n.id.to_string())
        .collect();
    orphans.sort();
    errors.extend(orphans.into_iter().map(VerifyError::Orphan));

    if errors.is_empty() {
        VerifyResult::success()
    } else {
        VerifyResult::failure(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::seed::sample_tree;

    fn id(s: &str) -> NodeId {
        NodeId::new(s).unwrap()
    }

    #[test]
    fn sample_tree_verifies() {
        let result = fast_verify(&sample_tree());
        assert!(result.ok, "{:?}", result.errors);
    }

    #[test]
    fn empty_tree_verifies() {
        assert!(fast_verify(&HierarchyTree::new()).ok);
    }

    #[test]
    fn verifies_after_moves() {
        let mut tree = sample_tree();
        tree.move_node(&id("s-c1-1"), &id("c2"), true).unwrap();
        tree.move_node(&id("b-d-ci-s-c3-1-1-1-1"), &id("d-ci-s-c2-5-3-2"), false)
            .unwrap();
        assert!(fast_verify(&tree).ok);
    }

    #[test]
    fn detects_parent_mismatch() {
        let mut tree = sample_tree();
        tree.node_mut(&id("s-c1-1")).unwrap().parent_id = Some(id("c3"));
        let result = fast_verify(&tree);
        assert!(!result.ok);
        assert!(result
            .errors
            .iter()
            .any(|e| matches!(e, VerifyError::ParentMismatch { .. })));
    }

    #[test]
    fn detects_orphan() {
        let mut tree = sample_tree();
        tree.children_mut(&id("c1"))
            .unwrap()
            .retain(|c| c != &id("s-c1-2"));
        let result = fast_verify(&tree);
        assert!(result
            .errors
            .contains(&VerifyError::Orphan("s-c1-2".to_string())));
    }

    #[test]
    fn detects_shared_ownership() {
        let mut tree = sample_tree();
        tree.children_mut(&id("c2")).unwrap().push(id("s-c1-1"));
        let result = fast_verify(&tree);
        assert!(result
            .errors
            .iter()
            .any(|e| matches!(e, VerifyError::SharedOwnership(_))));
    }

    #[test]
    fn skipped_levels_verify() {
        let mut tree = sample_tree();
        tree.move_node(&id("ci-s-c1-1-1"), &id("c2"), false).unwrap();
        tree.move_node(&id("b-d-ci-s-c3-1-1-1-1"), &id("s-c3-2"), false)
            .unwrap();
        let result = fast_verify(&tree);
        assert!(result.ok, "{:?}", result.errors);
    }

    #[test]
    fn detects_level_inversion() {
        let mut tree = sample_tree();
        tree.children_mut(&id("ci-s-c1-1-1"))
            .unwrap()
            .push(id("s-c2-1"));
        let result = fast_verify(&tree);
        assert!(result
            .errors
            .iter()
            .any(|e| matches!(e, VerifyError::LevelInversion { .. })));
    }
}
