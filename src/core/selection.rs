//! core::selection
//!
//! Cascading path selection used to pick the two ends of a transfer.
//!
//! # Cascade Reset
//!
//! A [`PathSelection`] holds at most one node per level. Changing level *L*
//! clears every level below *L* in the same call, so a deeper choice that
//! no longer sits under the new shallower one is never observable.
//!
//! # Example
//!
//! ```
//! use cadastre::core::selection::PathSelection;
//! use cadastre::core::types::{NodeId, NodeKind};
//!
//! let id = |s: &str| NodeId::new(s).unwrap();
//! let mut path = PathSelection::new();
//! path.set_level(NodeKind::Country, Some(id("c1")));
//! path.set_level(NodeKind::State, Some(id("s-c1-1")));
//! path.set_level(NodeKind::City, Some(id("ci-s-c1-1-1")));
//! assert_eq!(path.effective(), Some(&id("ci-s-c1-1-1")));
//!
//! path.set_level(NodeKind::State, Some(id("s-c1-2")));
//! assert_eq!(path.get(NodeKind::City), None);
//! assert_eq!(path.effective(), Some(&id("s-c1-2")));
//! ```

use serde::{Deserialize, Serialize};

use super::code::{PathIndices, TfCode, TransferCodes};
use super::error::TransferError;
use super::tree::{HierarchyTree, LocationNode};
use super::types::{NodeId, NodeKind};

/// One chosen node per level, shallowest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSelection {
    country: Option<NodeId>,
    state: Option<NodeId>,
    city: Option<NodeId>,
    district: Option<NodeId>,
    block: Option<NodeId>,
}

impl PathSelection {
    /// An empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// The full path from the root country down to `id`.
    ///
    /// Returns `None` for unknown ids.
    pub fn for_node(tree: &HierarchyTree, id: &NodeId) -> Option<Self> {
        let node = tree.find_node(id)?;
        let mut selection = Self::new();
        for ancestor in tree.ancestors(id).into_iter().rev() {
            *selection.slot_mut(ancestor.kind) = Some(ancestor.id.clone());
        }
        *selection.slot_mut(node.kind) = Some(node.id.clone());
        Some(selection)
    }

    /// The node chosen at `level`, if any.
    pub fn get(&self, level: NodeKind) -> Option<&NodeId> {
        match level {
            NodeKind::Country => self.country.as_ref(),
            NodeKind::State => self.state.as_ref(),
            NodeKind::City => self.city.as_ref(),
            NodeKind::District => self.district.as_ref(),
            NodeKind::Block => self.block.as_ref(),
        }
    }

    fn slot_mut(&mut self, level: NodeKind) -> &mut Option<NodeId> {
        match level {
            NodeKind::Country => &mut self.country,
            NodeKind::State => &mut self.state,
            NodeKind::City => &mut self.city,
            NodeKind::District => &mut self.district,
            NodeKind::Block => &mut self.block,
        }
    }

    /// Choose (or clear, with `None`) the node at `level`.
    ///
    /// Every deeper level is reset to unselected.
    pub fn set_level(&mut self, level: NodeKind, id: Option<NodeId>) {
        *self.slot_mut(level) = id;
        for deeper in &NodeKind::ALL[level.depth() + 1..] {
            *self.slot_mut(*deeper) = None;
        }
    }

    /// Shorthand for `set_level(level, None)`.
    pub fn clear(&mut self, level: NodeKind) {
        self.set_level(level, None);
    }

    /// The selected country.
    pub fn country(&self) -> Option<&NodeId> {
        self.country.as_ref()
    }

    /// The deepest selected node.
    ///
    /// A partial path resolves to its most specific choice.
    pub fn effective(&self) -> Option<&NodeId> {
        self.effective_level().and_then(|level| self.get(level))
    }

    /// Level of [`effective`](Self::effective).
    pub fn effective_level(&self) -> Option<NodeKind> {
        NodeKind::ALL
            .iter()
            .rev()
            .copied()
            .find(|level| self.get(*level).is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.effective_level().is_none()
    }
}

/// A path selection bound to the tree it is choosing from.
///
/// Unlike a bare [`PathSelection`], choices are checked against the
/// options currently on offer.
#[derive(Debug, Clone)]
pub struct CascadeForm<'a> {
    tree: &'a HierarchyTree,
    selection: PathSelection,
}

impl<'a> CascadeForm<'a> {
    pub fn new(tree: &'a HierarchyTree) -> Self {
        Self {
            tree,
            selection: PathSelection::new(),
        }
    }

    /// Options offered at `level`, in display order.
    ///
    /// Countries are always offered. Any other level lists the nodes of
    /// that kind directly under the nearest selected level above it, or
    /// nothing if no level above is selected.
    pub fn options(&self, level: NodeKind) -> Vec<&'a LocationNode> {
        if level == NodeKind::Country {
            return self.tree.countries();
        }
        let above = NodeKind::ALL[..level.depth()]
            .iter()
            .rev()
            .find_map(|kind| self.selection.get(*kind));
        match above {
            Some(parent) => self.tree.list_children(parent, Some(level)),
            None => Vec::new(),
        }
    }

    /// Choose `id` at `level`, clearing every deeper level.
    ///
    /// # Errors
    ///
    /// `ValidationError` if `id` is not among [`options`](Self::options).
    pub fn select(&mut self, level: NodeKind, id: &NodeId) -> Result<(), TransferError> {
        if !self.options(level).iter().any(|n| &n.id == id) {
            return Err(TransferError::validation(format!(
                "'{id}' is not a {level} under the current selection"
            )));
        }
        self.selection.set_level(level, Some(id.clone()));
        Ok(())
    }

    /// Clear `level` and everything below it.
    pub fn clear(&mut self, level: NodeKind) {
        self.selection.clear(level);
    }

    pub fn selection(&self) -> &PathSelection {
        &self.selection
    }

    pub fn into_selection(self) -> PathSelection {
        self.selection
    }

    pub fn effective(&self) -> Option<&NodeId> {
        self.selection.effective()
    }

    pub fn indices(&self) -> PathIndices {
        PathIndices::resolve(self.tree, &self.selection)
    }

    pub fn code(&self) -> TfCode {
        self.indices().code()
    }
}

/// Rules applied when validating a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftPolicy {
    /// Source and target must sit in different countries
    pub require_cross_country: bool,
}

impl Default for DraftPolicy {
    fn default() -> Self {
        Self {
            require_cross_country: true,
        }
    }
}

/// A transfer being composed from two path selections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferDraft {
    pub source: PathSelection,
    pub target: PathSelection,
    pub reason: String,
    pub transfer_resources: bool,
    pub requested_by: String,
}

/// A draft that passed validation, ready to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTransfer {
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub reason: String,
    pub transfer_resources: bool,
    pub requested_by: String,
    pub codes: TransferCodes,
}

impl TransferDraft {
    /// Check that the draft describes a submittable transfer.
    ///
    /// # Errors
    ///
    /// `ValidationError` when a country is missing, the source is a bare
    /// country, either end does not resolve, a path names levels that do
    /// not lead to its deepest node, both ends are the same node, both ends
    /// share a country (under the default policy), or the reason is blank.
    pub fn validate(
        &self,
        tree: &HierarchyTree,
        policy: DraftPolicy,
    ) -> Result<ValidatedTransfer, TransferError> {
        let source_country = self
            .source
            .country()
            .ok_or_else(|| TransferError::validation("source country is required"))?;
        let target_country = self
            .target
            .country()
            .ok_or_else(|| TransferError::validation("target country is required"))?;

        if self.source.effective_level() == Some(NodeKind::Country) {
            return Err(TransferError::validation(
                "select a state, city, district, or block to transfer",
            ));
        }
        let source_id = self
            .source
            .effective()
            .ok_or_else(|| TransferError::validation("source location is required"))?;
        let target_id = self
            .target
            .effective()
            .ok_or_else(|| TransferError::validation("target location is required"))?;

        if source_id == target_id {
            return Err(TransferError::validation(
                "source and target must be different locations",
            ));
        }
        for id in [source_id, target_id] {
            if !tree.contains(id) {
                return Err(TransferError::validation(format!(
                    "location '{id}' does not exist"
                )));
            }
        }
        for (side, path, id) in [
            ("source", &self.source, source_id),
            ("target", &self.target, target_id),
        ] {
            if tree.path_of(id).as_ref() != Some(path) {
                return Err(TransferError::validation(format!(
                    "{side} path does not lead to '{id}'"
                )));
            }
        }
        if policy.require_cross_country && source_country == target_country {
            return Err(TransferError::validation(
                "source and target must be in different countries",
            ));
        }

        let reason = self.reason.trim();
        if reason.is_empty() {
            return Err(TransferError::validation("a reason is required"));
        }

        Ok(ValidatedTransfer {
            source_id: source_id.clone(),
            target_id: target_id.clone(),
            reason: reason.to_string(),
            transfer_resources: self.transfer_resources,
            requested_by: self.requested_by.clone(),
            codes: TransferCodes::derive(tree, &self.source, &self.target),
        })
    }
}
