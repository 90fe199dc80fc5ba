//! core::code
//!
//! Fixed-width positional transfer codes (TF codes).
//!
//! # Layout
//!
//! ```text
//!  C SS CCC BBBB
//!  | |  |   +-- block index    (4 digits)
//!  | |  +------ city index     (3 digits)
//!  | +--------- state index    (2 digits)
//!  +----------- country index  (1 digit)
//! ```
//!
//! Each index is the 1-based position of the selected node among the
//! same-kind children of the nearest selected node above it, or `0` when
//! the level is unselected. Districts contribute no digits of their own. An index too
//! wide for its field keeps only its least-significant digits.

use serde::{Deserialize, Serialize};

use super::selection::PathSelection;
use super::tree::HierarchyTree;
use super::types::{NodeId, NodeKind};

/// Digit widths of the four code fields, in layout order.
pub const FIELD_WIDTHS: [usize; 4] = [1, 2, 3, 4];

/// Total code length.
pub const CODE_LEN: usize = 10;

/// 1-based position of `id` in `list`, or `0` when absent.
///
/// # Example
///
/// ```
/// use cadastre::core::code::index_in;
/// use cadastre::core::types::NodeId;
///
/// let list: Vec<NodeId> = ["a", "b"].iter().map(|s| NodeId::new(*s).unwrap()).collect();
/// assert_eq!(index_in(&list, &NodeId::new("a").unwrap()), 1);
/// assert_eq!(index_in(&list, &NodeId::new("z").unwrap()), 0);
/// assert_eq!(index_in(&[], &NodeId::new("a").unwrap()), 0);
/// ```
pub fn index_in(list: &[NodeId], id: &NodeId) -> usize {
    list.iter().position(|x| x == id).map_or(0, |p| p + 1)
}

/// A 10-digit positional code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TfCode(String);

impl TfCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The block field (last four digits).
    pub fn block_field(&self) -> &str {
        &self.0[CODE_LEN - FIELD_WIDTHS[3]..]
    }
}

impl std::fmt::Display for TfCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render one field, truncated to its width and zero-padded.
fn field(value: usize, width: usize) -> String {
    let modulus = 10usize.pow(width as u32);
    format!("{:0width$}", value % modulus, width = width)
}

/// Build a code from four positional indices.
///
/// # Example
///
/// ```
/// use cadastre::core::code::derive_code;
///
/// assert_eq!(derive_code(1, 2, 3, 4).as_str(), "1020030004");
/// assert_eq!(derive_code(0, 0, 0, 0).as_str(), "0000000000");
/// // Overwide fields keep their low digits.
/// assert_eq!(derive_code(12, 0, 0, 0).as_str(), "2000000000");
/// ```
pub fn derive_code(country: usize, state: usize, city: usize, block: usize) -> TfCode {
    let [cw, sw, ciw, bw] = FIELD_WIDTHS;
    TfCode(format!(
        "{}{}{}{}",
        field(country, cw),
        field(state, sw),
        field(city, ciw),
        field(block, bw)
    ))
}

/// Positional indices of a path selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathIndices {
    pub country: usize,
    pub state: usize,
    pub city: usize,
    pub district: usize,
    pub block: usize,
}

impl PathIndices {
    /// Resolve each selected level against the tree.
    ///
    /// A selected level is positioned among the nodes of its own kind
    /// directly under the nearest selected level above it. Unselected
    /// levels are skipped with index `0`, so a city moved straight under a
    /// country still resolves. Resolution stops at the first selection
    /// that does not sit where the path says it does.
    pub fn resolve(tree: &HierarchyTree, selection: &PathSelection) -> Self {
        let mut indices = [0usize; 5];
        let mut parent: Option<&NodeId> = None;

        for kind in NodeKind::ALL {
            let Some(chosen) = selection.get(kind) else {
                continue;
            };
            let siblings: Vec<NodeId> = match parent {
                None => tree.root_ids().to_vec(),
                Some(parent) => tree
                    .list_children(parent, Some(kind))
                    .into_iter()
                    .map(|n| n.id.clone())
                    .collect(),
            };
            let position = index_in(&siblings, chosen);
            if position == 0 {
                break;
            }
            indices[kind.depth()] = position;
            parent = Some(chosen);
        }

        let [country, state, city, district, block] = indices;
        Self {
            country,
            state,
            city,
            district,
            block,
        }
    }

    /// Code for this position.
    pub fn code(&self) -> TfCode {
        derive_code(self.country, self.state, self.city, self.block)
    }
}

/// Code of a single node, derived from its ancestor chain.
///
/// Returns `None` for unknown ids.
pub fn code_for_node(tree: &HierarchyTree, id: &NodeId) -> Option<TfCode> {
    let selection = PathSelection::for_node(tree, id)?;
    Some(PathIndices::resolve(tree, &selection).code())
}

/// Codes describing a two-sided transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCodes {
    /// Where the node is now
    pub source: TfCode,
    /// Where it is going; block field always zero
    pub target: TfCode,
    /// Target country/state/city with the source block
    pub combined: TfCode,
}

impl TransferCodes {
    /// Derive all three codes from the two selections.
    ///
    /// # Example
    ///
    /// ```
    /// use cadastre::core::code::TransferCodes;
    /// use cadastre::core::seed::sample_tree;
    /// use cadastre::core::selection::PathSelection;
    /// use cadastre::core::types::NodeKind;
    ///
    /// let tree = sample_tree();
    /// let mut source = PathSelection::new();
    /// source.set_level(NodeKind::Country, Some("c1".parse().unwrap()));
    /// source.set_level(NodeKind::State, Some("s-c1-1".parse().unwrap()));
    /// let mut target = PathSelection::new();
    /// target.set_level(NodeKind::Country, Some("c2".parse().unwrap()));
    ///
    /// let codes = TransferCodes::derive(&tree, &source, &target);
    /// assert_eq!(codes.source.as_str(), "1010000000");
    /// assert_eq!(codes.target.as_str(), "2000000000");
    /// assert_eq!(codes.combined.as_str(), "2000000000");
    /// ```
    pub fn derive(tree: &HierarchyTree, source: &PathSelection, target: &PathSelection) -> Self {
        let s = PathIndices::resolve(tree, source);
        let t = PathIndices::resolve(tree, target);
        Self {
            source: s.code(),
            target: derive_code(t.country, t.state, t.city, 0),
            combined: derive_code(t.country, t.state, t.city, s.block),
        }
    }
}
