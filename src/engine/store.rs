//! engine::store
//!
//! Shared, thread-safe owner of the location hierarchy.
//!
//! # Architecture
//!
//! The store publishes immutable snapshots:
//! - The current tree lives behind `RwLock<Arc<HierarchyTree>>`
//! - Readers clone the `Arc` and never hold the lock while walking
//! - A mutation copies the tree only if a reader still holds the old
//!   snapshot, applies the move, then bumps the version
//! - A rejected move leaves the contents untouched, so a copy made for
//!   it matches the published tree exactly
//! - Observers receive each new snapshot after the lock is released
//!
//! # Invariants
//!
//! - A reader never sees a half-applied move
//! - Versions increase by one per successful mutation
//! - Failed moves publish nothing and leave the version alone
//! - Observers see versions in increasing order, never twice

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::debug;

use crate::core::error::TransferError;
use crate::core::seed::sample_tree;
use crate::core::tree::{HierarchyTree, LocationNode, LocationView, MoveOutcome};
use crate::core::types::{Fingerprint, NodeId, NodeKind};

use super::events::LocationsObserver;

/// An immutable view of the hierarchy at one version.
#[derive(Debug, Clone)]
pub struct LocationsSnapshot {
    /// Number of successful mutations before this snapshot
    pub version: u64,
    /// The tree as of `version`
    pub tree: Arc<HierarchyTree>,
}

impl LocationsSnapshot {
    /// Owned nested view of every root.
    pub fn roots(&self) -> Vec<LocationView> {
        self.tree.nested()
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.tree.fingerprint()
    }
}

#[derive(Debug)]
struct Published {
    version: u64,
    tree: Arc<HierarchyTree>,
}

/// The hierarchy store.
///
/// # Example
///
/// ```
/// use cadastre::engine::store::HierarchyStore;
/// use cadastre::core::types::NodeId;
///
/// let store = HierarchyStore::seeded();
/// let id = |s: &str| NodeId::new(s).unwrap();
///
/// store.move_node(&id("s-c1-1"), &id("c2"), true).unwrap();
/// assert_eq!(store.find_parent(&id("s-c1-1")).unwrap().id, id("c2"));
/// assert_eq!(store.version(), 1);
/// ```
pub struct HierarchyStore {
    current: RwLock<Published>,
    observers: RwLock<Vec<Arc<dyn LocationsObserver>>>,
    /// Highest version handed to observers
    delivered: Mutex<u64>,
}

impl std::fmt::Debug for HierarchyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchyStore")
            .field("version", &self.version())
            .field("observers", &self.observer_count())
            .finish()
    }
}

impl HierarchyStore {
    /// Wrap an existing tree at version 0.
    pub fn new(tree: HierarchyTree) -> Self {
        Self {
            current: RwLock::new(Published {
                version: 0,
                tree: Arc::new(tree),
            }),
            observers: RwLock::new(Vec::new()),
            delivered: Mutex::new(0),
        }
    }

    /// A store holding the deterministic sample hierarchy.
    pub fn seeded() -> Self {
        Self::new(sample_tree())
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> LocationsSnapshot {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        LocationsSnapshot {
            version: current.version,
            tree: Arc::clone(&current.tree),
        }
    }

    /// The current version.
    pub fn version(&self) -> u64 {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .version
    }

    fn tree(&self) -> Arc<HierarchyTree> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner).tree)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.tree().contains(id)
    }

    /// Look up a node by id.
    pub fn find_node(&self, id: &NodeId) -> Option<LocationNode> {
        self.tree().find_node(id).cloned()
    }

    /// The node whose children list `id`; `None` for roots and unknown ids.
    pub fn find_parent(&self, id: &NodeId) -> Option<LocationNode> {
        self.tree().find_parent(id).cloned()
    }

    /// Children of `id` in display order, optionally filtered by kind.
    pub fn list_children(&self, id: &NodeId, kind: Option<NodeKind>) -> Vec<LocationNode> {
        self.tree()
            .list_children(id, kind)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Relocate `source` and its subtree beneath `target`, then notify
    /// observers.
    ///
    /// # Errors
    ///
    /// See [`HierarchyTree::move_node`]. On error nothing is published.
    pub fn move_node(
        &self,
        source: &NodeId,
        target: &NodeId,
        merge_resources: bool,
    ) -> Result<MoveOutcome, TransferError> {
        let (outcome, snapshot) = self.apply_move(source, target, merge_resources)?;
        self.publish(&snapshot);
        Ok(outcome)
    }

    /// Apply a move under the write lock without notifying observers.
    ///
    /// Callers holding other locks use this and call
    /// [`publish`](Self::publish) once those locks are released.
    pub(crate) fn apply_move(
        &self,
        source: &NodeId,
        target: &NodeId,
        merge_resources: bool,
    ) -> Result<(MoveOutcome, LocationsSnapshot), TransferError> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);

        // Copies only while a reader still holds the previous snapshot.
        let tree = Arc::make_mut(&mut current.tree);
        let outcome = match tree.move_node(source, target, merge_resources) {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(source = %source, target = %target, error = %err, "move rejected");
                return Err(err);
            }
        };
        current.version += 1;

        debug!(
            source = %outcome.source,
            from = ?outcome.from_parent.as_ref().map(NodeId::as_str),
            to = %outcome.to_parent,
            merged_food = ?outcome.merged_food,
            version = current.version,
            "moved node"
        );

        Ok((
            outcome,
            LocationsSnapshot {
                version: current.version,
                tree: Arc::clone(&current.tree),
            },
        ))
    }

    /// Deliver `snapshot` to every observer unless a newer one already went out.
    pub(crate) fn publish(&self, snapshot: &LocationsSnapshot) {
        let mut delivered = self.delivered.lock().unwrap_or_else(PoisonError::into_inner);
        if snapshot.version <= *delivered {
            return;
        }
        *delivered = snapshot.version;

        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for observer in observers {
            observer.on_locations_changed(snapshot);
        }
    }

    /// Register an observer for future snapshots.
    pub fn subscribe(&self, observer: Arc<dyn LocationsObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for HierarchyStore {
    fn default() -> Self {
        Self::seeded()
    }
}
