//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Calls the engine to execute the command
//! 3. Formats and displays output
//!
//! Handlers do NOT mutate the hierarchy directly; moves only happen
//! through an approved request.

mod code;
mod completion;
mod config_cmd;
mod relationships;
mod session;
mod transfer;
mod tree;

// Re-export command functions for testing and direct invocation
pub use code::code;
pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, set as config_set};
pub use relationships::{children, parent};
pub use session::{session, Session, SessionOutcome};
pub use transfer::transfer;
pub use tree::tree;

use std::sync::Arc;

use anyhow::Result;

use super::args::{Command, ConfigAction};
use crate::engine::{Context, Engine};
use crate::ui::output::{TerminalSink, Verbosity};

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Tree { node, depth, codes } => tree::tree(ctx, node.as_ref(), depth, codes),
        Command::Children { id, kind } => relationships::children(ctx, &id, kind),
        Command::Parent { id } => relationships::parent(ctx, &id),
        Command::Code { id, path } => code::code(ctx, id.as_ref(), &path),
        Command::Transfer {
            source,
            target,
            reason,
            resources,
            requested_by,
            allow_same_country,
            approve,
            reject,
        } => transfer::transfer(
            ctx,
            transfer::TransferArgs {
                source,
                target,
                reason,
                resources,
                requested_by,
                allow_same_country,
                approve,
                reject,
            },
        ),
        Command::Session => session::session(ctx),
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
            ConfigAction::List => config_cmd::list(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

pub(crate) fn verbosity(ctx: &Context) -> Verbosity {
    Verbosity::from_flags(ctx.quiet, ctx.debug)
}

/// A freshly seeded engine whose alerts print to the terminal.
pub(crate) fn seeded_engine(ctx: &Context) -> Engine {
    Engine::seeded(&ctx.config, Arc::new(TerminalSink::new(verbosity(ctx))))
}
