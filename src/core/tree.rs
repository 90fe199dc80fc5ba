//! core::tree
//!
//! Location hierarchy representation and the subtree move primitive.
//!
//! # Architecture
//!
//! The hierarchy is an arena of nodes keyed by id:
//! - Each node stores its parent id and an ordered list of child ids
//! - Roots are countries, kept in insertion order
//! - A move is an index update on two child lists, never a copy of the subtree
//!
//! # Invariants
//!
//! - Tree must be acyclic
//! - Every child's kind is below its parent's kind
//! - [`HierarchyTree::insert`] adds exactly one level down; a move may
//!   leave a wider gap (a city directly under a country)
//! - Every non-country node is listed by exactly one parent
//! - Ids are unique across the whole tree

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::TransferError;
use super::selection::PathSelection;
use super::types::{Fingerprint, NodeId, NodeKind, Resources};

/// Errors from building a tree.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("parent not found: {0}")]
    ParentNotFound(NodeId),

    #[error("root node '{id}' must be a country, got {kind}")]
    RootMustBeCountry { id: NodeId, kind: NodeKind },

    #[error("{kind} '{id}' cannot be a child of {parent_kind} '{parent}'")]
    LevelMismatch {
        id: NodeId,
        kind: NodeKind,
        parent: NodeId,
        parent_kind: NodeKind,
    },
}

/// One location in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationNode {
    /// Stable identifier
    pub id: NodeId,
    /// Display label
    pub name: String,
    /// Administrative level, fixed at creation
    pub kind: NodeKind,
    /// Owning node, `None` only for countries
    pub parent_id: Option<NodeId>,
    /// Resource quantities
    pub resources: Resources,
    children: Vec<NodeId>,
}

impl LocationNode {
    /// Child ids in display order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Owned nested rendering of a subtree.
///
/// Produced for observers and JSON output; mutating it has no effect on
/// the tree it was taken from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationView {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub parent_id: Option<NodeId>,
    pub resources: Resources,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LocationView>,
}

/// What a successful move changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The node that moved (with its subtree)
    pub source: NodeId,
    /// Previous parent, if any
    pub from_parent: Option<NodeId>,
    /// New parent
    pub to_parent: NodeId,
    /// Quantity of food added to the new parent, if resources were merged
    pub merged_food: Option<u64>,
}

/// The location hierarchy.
#[derive(Debug, Clone, Default)]
pub struct HierarchyTree {
    nodes: HashMap<NodeId, LocationNode>,
    roots: Vec<NodeId>,
}

impl HierarchyTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node as the last child of `parent`, or as a new root.
    ///
    /// # Errors
    ///
    /// Fails if the id is taken, the parent is missing, a root is not a
    /// country, or the kind is not exactly one level below the parent's.
    pub fn insert(
        &mut self,
        parent: Option<&NodeId>,
        id: NodeId,
        name: impl Into<String>,
        kind: NodeKind,
        resources: Resources,
    ) -> Result<(), TreeError> {
        if self.nodes.contains_key(&id) {
            return Err(TreeError::DuplicateId(id));
        }

        match parent {
            None => {
                if kind != NodeKind::Country {
                    return Err(TreeError::RootMustBeCountry { id, kind });
                }
                self.roots.push(id.clone());
            }
            Some(parent_id) => {
                let parent_node = self
                    .nodes
                    .get_mut(parent_id)
                    .ok_or_else(|| TreeError::ParentNotFound(parent_id.clone()))?;
                if kind.parent_kind() != Some(parent_node.kind) {
                    return Err(TreeError::LevelMismatch {
                        id,
                        kind,
                        parent: parent_id.clone(),
                        parent_kind: parent_node.kind,
                    });
                }
                parent_node.children.push(id.clone());
            }
        }

        self.nodes.insert(
            id.clone(),
            LocationNode {
                id,
                name: name.into(),
                kind,
                parent_id: parent.cloned(),
                resources,
                children: Vec::new(),
            },
        );
        Ok(())
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a node with this id exists.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Root ids in insertion order.
    pub fn root_ids(&self) -> &[NodeId] {
        &self.roots
    }

    /// Root nodes in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = &LocationNode> {
        self.roots.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Root nodes that are countries.
    ///
    /// Equal to [`roots`](Self::roots) for any tree built through
    /// [`insert`](Self::insert).
    pub fn countries(&self) -> Vec<&LocationNode> {
        self.roots()
            .filter(|n| n.kind == NodeKind::Country)
            .collect()
    }

    /// Look up a node by id.
    pub fn find_node(&self, id: &NodeId) -> Option<&LocationNode> {
        self.nodes.get(id)
    }

    /// The node whose child list contains `id`.
    ///
    /// Returns `None` for roots and unknown ids.
    pub fn find_parent(&self, id: &NodeId) -> Option<&LocationNode> {
        let parent_id = self.nodes.get(id)?.parent_id.as_ref()?;
        self.nodes
            .get(parent_id)
            .filter(|parent| parent.children.contains(id))
    }

    /// Children of `id` in order, optionally filtered by kind.
    ///
    /// Unknown ids have no children.
    pub fn list_children(&self, id: &NodeId, kind: Option<NodeKind>) -> Vec<&LocationNode> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };
        node.children
            .iter()
            .filter_map(|child| self.nodes.get(child))
            .filter(|child| kind.map_or(true, |k| child.kind == k))
            .collect()
    }

    /// Ancestors of `id`, immediate parent first.
    pub fn ancestors(&self, id: &NodeId) -> Vec<&LocationNode> {
        let mut result = Vec::new();
        let mut current = self.find_parent(id);

        while let Some(parent) = current {
            result.push(parent);
            current = self.find_parent(&parent.id);
        }

        result
    }

    /// All descendant ids of `id` in pre-order, excluding `id` itself.
    pub fn descendants(&self, id: &NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<&NodeId> = match self.nodes.get(id) {
            Some(node) => node.children.iter().rev().collect(),
            None => return result,
        };

        while let Some(current) = stack.pop() {
            result.push(current.clone());
            if let Some(node) = self.nodes.get(current) {
                stack.extend(node.children.iter().rev());
            }
        }

        result
    }

    /// Whether `candidate` is `ancestor` or lies somewhere beneath it.
    pub fn is_within(&self, candidate: &NodeId, ancestor: &NodeId) -> bool {
        if candidate == ancestor {
            return true;
        }
        self.ancestors(candidate)
            .iter()
            .any(|node| &node.id == ancestor)
    }

    /// Path selection from the root country down to `id`.
    pub fn path_of(&self, id: &NodeId) -> Option<PathSelection> {
        PathSelection::for_node(self, id)
    }

    /// Pre-order walk over every node with its depth below the roots.
    pub fn walk(&self) -> Vec<(usize, &LocationNode)> {
        let mut result = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, &NodeId)> = self.roots.iter().rev().map(|id| (0, id)).collect();

        while let Some((depth, id)) = stack.pop() {
            if let Some(node) = self.nodes.get(id) {
                result.push((depth, node));
                stack.extend(node.children.iter().rev().map(|c| (depth + 1, c)));
            }
        }

        result
    }

    /// Relocate `source` and its whole subtree beneath `target`.
    ///
    /// The subtree keeps its internal structure. When `merge_resources` is
    /// set, the source node's own quantities are added once to the target;
    /// quantities further down are left alone.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if either id is unknown
    /// - `InvalidMove` if `target` is `source` or lies inside its subtree
    /// - `LevelMismatch` if `target` is not above `source` in the level
    ///   order (countries never move)
    ///
    /// On error the tree is untouched.
    pub fn move_node(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        merge_resources: bool,
    ) -> Result<MoveOutcome, TransferError> {
        let source_node = self
            .nodes
            .get(source)
            .ok_or_else(|| TransferError::NodeNotFound(source.clone()))?;
        let target_node = self
            .nodes
            .get(target)
            .ok_or_else(|| TransferError::NodeNotFound(target.clone()))?;

        if source == target {
            return Err(TransferError::InvalidMove(format!(
                "cannot move '{source}' into itself"
            )));
        }
        if self.is_within(target, source) {
            return Err(TransferError::InvalidMove(format!(
                "'{target}' lies inside the subtree of '{source}'"
            )));
        }
        if source_node.kind.depth() <= target_node.kind.depth() {
            return Err(TransferError::LevelMismatch {
                source_id: source.clone(),
                source_kind: source_node.kind,
                target_id: target.clone(),
                target_kind: target_node.kind,
            });
        }

        let from_parent = source_node.parent_id.clone();
        let carried = source_node.resources;

        // Validation is complete; nothing below can fail.
        match &from_parent {
            Some(parent_id) => {
                if let Some(parent) = self.nodes.get_mut(parent_id) {
                    parent.children.retain(|c| c != source);
                }
            }
            None => self.roots.retain(|r| r != source),
        }

        let mut merged_food = None;
        if let Some(target_node) = self.nodes.get_mut(target) {
            target_node.children.push(source.clone());
            if merge_resources {
                target_node.resources.absorb(&carried);
                merged_food = Some(carried.food);
            }
        }
        if let Some(source_node) = self.nodes.get_mut(source) {
            source_node.parent_id = Some(target.clone());
        }

        Ok(MoveOutcome {
            source: source.clone(),
            from_parent,
            to_parent: target.clone(),
            merged_food,
        })
    }

    /// Owned nested view of one subtree.
    pub fn view_of(&self, id: &NodeId) -> Option<LocationView> {
        let node = self.nodes.get(id)?;
        Some(LocationView {
            id: node.id.clone(),
            name: node.name.clone(),
            kind: node.kind,
            parent_id: node.parent_id.clone(),
            resources: node.resources,
            children: node
                .children
                .iter()
                .filter_map(|child| self.view_of(child))
                .collect(),
        })
    }

    /// Owned nested view of the whole forest.
    pub fn nested(&self) -> Vec<LocationView> {
        self.roots.iter().filter_map(|id| self.view_of(id)).collect()
    }

    /// Stable hash over structure, names, and quantities.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compute(self.walk().into_iter().map(|(depth, node)| {
            format!(
                "{}|{}|{}|{}|{}|{}",
                depth,
                node.id,
                node.kind,
                node.parent_id.as_ref().map_or("-", |p| p.as_str()),
                node.resources.food,
                node.name
            )
        }))
    }

    /// Iterate all nodes in unspecified order.
    pub(crate) fn nodes(&self) -> impl Iterator<Item = &LocationNode> {
        self.nodes.values()
    }

    #[cfg(test)]
    pub(crate) fn node_mut(&mut self, id: &NodeId) -> Option<&mut LocationNode> {
        self.nodes.get_mut(id)
    }

    #[cfg(test)]
    pub(crate) fn children_mut(&mut self, id: &NodeId) -> Option<&mut Vec<NodeId>> {
        self.nodes.get_mut(id).map(|n| &mut n.children)
    }
}
