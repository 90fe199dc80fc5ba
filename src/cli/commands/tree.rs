//! tree command - Display the location hierarchy

use anyhow::{bail, Result};

use super::{seeded_engine, verbosity};
use crate::core::types::NodeId;
use crate::engine::Context;
use crate::ui::output;
use crate::ui::tree_view::{render, TreeViewOptions};

/// Print the hierarchy, or one subtree of it.
pub fn tree(ctx: &Context, node: Option<&NodeId>, depth: Option<usize>, codes: bool) -> Result<()> {
    let engine = seeded_engine(ctx);
    let snapshot = engine.store.snapshot();

    if let Some(id) = node {
        if !snapshot.tree.contains(id) {
            bail!("Location '{}' not found", id);
        }
    }

    if ctx.json {
        let views = match node {
            Some(id) => snapshot.tree.view_of(id).into_iter().collect(),
            None => snapshot.roots(),
        };
        output::json(&views)?;
        return Ok(());
    }

    let options = TreeViewOptions {
        root: node.cloned(),
        depth,
        codes,
    };
    let lines = render(&snapshot.tree, &options);
    output::print(lines.join("\n"), verbosity(ctx));
    output::debug(
        format!("fingerprint {}", snapshot.fingerprint().short()),
        verbosity(ctx),
    );
    Ok(())
}
