//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is enabled, output is machine-readable JSON.

use std::fmt::Display;

use serde::Serialize;

use crate::core::request::TransferRequest;
use crate::engine::events::{Alert, AlertKind, AlertSink};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print pretty JSON to stdout.
pub fn json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line alert rendering: `[kind] Title: description`.
pub fn format_alert(alert: &Alert) -> String {
    if alert.description.is_empty() {
        format!("[{}] {}", alert.kind, alert.title)
    } else {
        format!("[{}] {}: {}", alert.kind, alert.title, alert.description)
    }
}

/// One-line request summary for listings.
pub fn format_request(request: &TransferRequest) -> String {
    let resources = if request.transfer_resources {
        " +resources"
    } else {
        ""
    };
    let code = request
        .codes
        .as_ref()
        .map(|c| format!(" [{}]", c.combined))
        .unwrap_or_default();
    format!(
        "{}  {:<8}  {} -> {}{}{}  by {}: {}",
        request.id.short(),
        request.status,
        request.source_id,
        request.target_id,
        resources,
        code,
        request.requested_by,
        request.reason
    )
}

/// Alert sink that writes alerts to the terminal.
///
/// Errors always go to stderr; everything else is dropped in quiet mode.
#[derive(Debug, Clone, Copy)]
pub struct TerminalSink {
    verbosity: Verbosity,
}

impl TerminalSink {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

impl AlertSink for TerminalSink {
    fn alert(&self, alert: Alert) {
        match alert.kind {
            AlertKind::Error => eprintln!("{}", format_alert(&alert)),
            _ if self.verbosity == Verbosity::Quiet => {}
            _ => eprintln!("{}", format_alert(&alert)),
        }
    }
}
