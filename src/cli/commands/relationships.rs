//! parent and children commands - Simple relationship queries

use anyhow::{bail, Result};
use serde::Serialize;

use super::seeded_engine;
use crate::core::tree::LocationNode;
use crate::core::types::{NodeId, NodeKind};
use crate::engine::Context;
use crate::ui::output;

#[derive(Serialize)]
struct NodeSummary<'a> {
    id: &'a NodeId,
    name: &'a str,
    kind: NodeKind,
    food: u64,
}

impl<'a> From<&'a LocationNode> for NodeSummary<'a> {
    fn from(node: &'a LocationNode) -> Self {
        Self {
            id: &node.id,
            name: &node.name,
            kind: node.kind,
            food: node.resources.food,
        }
    }
}

/// Print the parent of a location.
///
/// Outputs nothing (exit 0) if the location is a country.
pub fn parent(ctx: &Context, id: &NodeId) -> Result<()> {
    let engine = seeded_engine(ctx);
    if !engine.store.contains(id) {
        bail!("Location '{}' not found", id);
    }

    let parent = engine.store.find_parent(id);
    if ctx.json {
        output::json(&parent.as_ref().map(NodeSummary::from))?;
    } else if let Some(parent) = parent {
        println!("{}", parent.id);
    }
    // No output for countries

    Ok(())
}

/// Print the children of a location, one id per line.
///
/// Outputs nothing (exit 0) if the location has no matching children.
pub fn children(ctx: &Context, id: &NodeId, kind: Option<NodeKind>) -> Result<()> {
    let engine = seeded_engine(ctx);
    if !engine.store.contains(id) {
        bail!("Location '{}' not found", id);
    }

    let children = engine.store.list_children(id, kind);
    if ctx.json {
        let summaries: Vec<NodeSummary<'_>> = children.iter().map(NodeSummary::from).collect();
        output::json(&summaries)?;
    } else {
        for child in &children {
            println!("{}", child.id);
        }
    }

    Ok(())
}
