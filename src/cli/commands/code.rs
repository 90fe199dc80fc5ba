//! code command - Derive transfer codes

use anyhow::{anyhow, bail, Context as _, Result};
use serde_json::json;

use super::{seeded_engine, verbosity};
use crate::cli::args::PathArgs;
use crate::core::selection::CascadeForm;
use crate::core::types::{NodeId, NodeKind};
use crate::engine::Context;
use crate::ui::output;

/// Print the code of a location, or of a partial path chosen level by level.
///
/// Path levels are applied shallowest first through a cascade form, so
/// each choice must be among the children of the one above it.
pub fn code(ctx: &Context, id: Option<&NodeId>, path: &PathArgs) -> Result<()> {
    let engine = seeded_engine(ctx);
    let snapshot = engine.store.snapshot();
    let tree = &snapshot.tree;

    let levels: Vec<(NodeKind, NodeId)> = match id {
        Some(id) => {
            let full = tree
                .path_of(id)
                .ok_or_else(|| anyhow!("Location '{}' not found", id))?;
            NodeKind::ALL
                .iter()
                .filter_map(|kind| full.get(*kind).map(|chosen| (*kind, chosen.clone())))
                .collect()
        }
        None => path
            .levels()
            .into_iter()
            .map(|(kind, chosen)| (kind, chosen.clone()))
            .collect(),
    };
    if levels.is_empty() {
        bail!("Give a location id or at least --country");
    }

    let mut form = CascadeForm::new(tree);
    for (kind, chosen) in &levels {
        form.select(*kind, chosen)
            .with_context(|| format!("Invalid --{} selection", kind))?;
    }
    let code = form.code();

    if ctx.json {
        output::json(&json!({
            "node": form.effective(),
            "code": code,
            "indices": form.indices(),
        }))?;
    } else {
        println!("{}", code);
        if let Some(effective) = form.effective() {
            output::debug(format!("resolved to {}", effective), verbosity(ctx));
        }
    }
    Ok(())
}
