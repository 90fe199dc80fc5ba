//! transfer command - Submit and optionally resolve a transfer request

use anyhow::{anyhow, Result};
use serde_json::json;

use super::{seeded_engine, verbosity};
use crate::core::selection::TransferDraft;
use crate::core::types::NodeId;
use crate::engine::Context;
use crate::ui::output;

/// Arguments for [`transfer`].
#[derive(Debug, Clone)]
pub struct TransferArgs {
    pub source: NodeId,
    pub target: NodeId,
    pub reason: String,
    pub resources: bool,
    pub requested_by: Option<String>,
    pub allow_same_country: bool,
    pub approve: bool,
    pub reject: bool,
}

/// Submit a transfer request built from the full paths of both ends.
pub fn transfer(ctx: &Context, args: TransferArgs) -> Result<()> {
    let engine = seeded_engine(ctx);
    let snapshot = engine.store.snapshot();

    let source = snapshot
        .tree
        .path_of(&args.source)
        .ok_or_else(|| anyhow!("Location '{}' not found", args.source))?;
    let target = snapshot
        .tree
        .path_of(&args.target)
        .ok_or_else(|| anyhow!("Location '{}' not found", args.target))?;

    let draft = TransferDraft {
        source,
        target,
        reason: args.reason,
        transfer_resources: args.resources || ctx.config.transfer_resources(),
        requested_by: args
            .requested_by
            .unwrap_or_else(|| ctx.config.requested_by().to_string()),
    };
    let mut policy = ctx.config.draft_policy();
    if args.allow_same_country {
        policy.require_cross_country = false;
    }

    let mut request = engine.workflow.submit_draft(&draft, policy)?;
    if args.approve {
        request = engine.workflow.approve(&request.id)?;
    } else if args.reject {
        request = engine.workflow.reject(&request.id)?;
    }

    let parent = engine.store.find_parent(&request.source_id);
    let target_food = engine
        .store
        .find_node(&request.target_id)
        .map(|n| n.resources.food);

    if ctx.json {
        output::json(&json!({
            "request": request,
            "parent": parent.as_ref().map(|p| &p.id),
            "target_food": target_food,
            "version": engine.store.version(),
        }))?;
        return Ok(());
    }

    let verbosity = verbosity(ctx);
    output::print(output::format_request(&request), verbosity);
    if let Some(codes) = &request.codes {
        output::print(
            format!(
                "codes: source {} target {} combined {}",
                codes.source, codes.target, codes.combined
            ),
            verbosity,
        );
    }
    if let Some(parent) = parent {
        output::print(format!("{} is under {}", request.source_id, parent.id), verbosity);
    }
    if let Some(food) = target_food {
        output::print(format!("{} food: {}", request.target_id, food), verbosity);
    }
    Ok(())
}
