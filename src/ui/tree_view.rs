//! ui::tree_view
//!
//! Indented text rendering of the location hierarchy.

use crate::core::code::code_for_node;
use crate::core::tree::{HierarchyTree, LocationNode};
use crate::core::types::{NodeId, NodeKind};

/// How much of the tree to draw.
#[derive(Debug, Clone, Default)]
pub struct TreeViewOptions {
    /// Start from this node instead of every root
    pub root: Option<NodeId>,
    /// Levels below the start to include; `None` draws everything
    pub depth: Option<usize>,
    /// Append each node's transfer code
    pub codes: bool,
}

/// One line per node, children indented two spaces under their parent.
///
/// Returns an empty list when `options.root` is unknown.
///
/// # Example
///
/// ```
/// use cadastre::core::seed::sample_tree;
/// use cadastre::ui::tree_view::{render, TreeViewOptions};
///
/// let lines = render(&sample_tree(), &TreeViewOptions { depth: Some(0), ..Default::default() });
/// assert_eq!(lines[0], "Country 1 (c1) country, food 1000, 5 states");
/// ```
pub fn render(tree: &HierarchyTree, options: &TreeViewOptions) -> Vec<String> {
    let starts: Vec<&LocationNode> = match &options.root {
        Some(id) => tree.find_node(id).into_iter().collect(),
        None => tree.roots().collect(),
    };

    let mut lines = Vec::new();
    let mut stack: Vec<(usize, &LocationNode)> = starts.into_iter().rev().map(|n| (0, n)).collect();
    while let Some((depth, node)) = stack.pop() {
        lines.push(format!("{}{}", "  ".repeat(depth), describe(tree, node, options.codes)));
        if options.depth.map_or(true, |max| depth < max) {
            stack.extend(
                tree.list_children(&node.id, None)
                    .into_iter()
                    .rev()
                    .map(|child| (depth + 1, child)),
            );
        }
    }
    lines
}

/// `Name (id) kind, food N, M children`.
///
/// Children that skip a level are counted under their own kind, after the
/// regular ones: `Country 2 (c2) country, food 2000, 5 states, 1 city`.
pub fn describe(tree: &HierarchyTree, node: &LocationNode, with_code: bool) -> String {
    let mut line = format!(
        "{} ({}) {}, food {}",
        node.name, node.id, node.kind, node.resources.food
    );
    let counts: Vec<(NodeKind, usize)> = NodeKind::ALL[node.kind.depth() + 1..]
        .iter()
        .map(|kind| (*kind, tree.list_children(&node.id, Some(*kind)).len()))
        .collect();
    for (i, (kind, count)) in counts.iter().enumerate() {
        // The regular child level is always shown, even when empty.
        if *count == 0 && i > 0 {
            continue;
        }
        let noun = if *count == 1 {
            kind.as_str()
        } else {
            kind.plural()
        };
        line.push_str(&format!(", {count} {noun}"));
    }
    if with_code {
        if let Some(code) = code_for_node(tree, &node.id) {
            line.push_str(&format!(" #{code}"));
        }
    }
    line
}
