//! cli
//!
//! Command-line interface layer for Cadastre.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the tracing subscriber
//! - Load configuration
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! command handlers, which drive the [`crate::engine`]. No handler touches
//! the hierarchy except through the engine's store and workflow.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::{Context as _, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::core::config::Config;
use crate::engine;
use crate::ui::output::{self, Verbosity};

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "CADASTRE_LOG";

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    let loaded = Config::load().context("Failed to load config")?;
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    for warning in &loaded.warnings {
        output::warn(
            format!("{} ({})", warning.message, warning.path.display()),
            verbosity,
        );
    }
    if let Some(path) = loaded.config.loaded_from() {
        output::debug(format!("config loaded from {}", path.display()), verbosity);
    }

    let ctx = engine::Context {
        debug: cli.debug,
        quiet: cli.quiet,
        json: cli.json,
        config: loaded.config,
    };

    commands::dispatch(cli.command, &ctx)
}

/// Install a compact stderr subscriber.
///
/// `CADASTRE_LOG` wins when set; otherwise `--debug` selects
/// `cadastre=debug` and the default is `cadastre=warn`.
fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(if debug {
            "cadastre=debug,warn"
        } else {
            "cadastre=warn,error"
        })
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}
