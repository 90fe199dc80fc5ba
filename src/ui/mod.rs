//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting, verbosity, and the terminal alert sink
//! - [`prompts`] - Line-oriented prompts and confirmations
//! - [`tree_view`] - Indented rendering of the hierarchy
//!
//! # Design
//!
//! The UI module provides a consistent interface for user interaction.
//! All output and prompts go through this module to ensure consistent
//! formatting and proper handling of interactive vs non-interactive modes.

pub mod output;
pub mod prompts;
pub mod tree_view;
