//! Cadastre - administrative location hierarchy with approval-gated transfers
//!
//! Cadastre keeps a five-level hierarchy (country, state, city, district,
//! block) in memory and lets callers move whole subtrees between owners
//! through a submit/approve/reject workflow. Each request can carry
//! positional transfer codes, and approval can merge the moved node's
//! resources into its new parent.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Lock-protected store, workflow, and notifications
//! - [`core`] - Domain types, tree, codes, selection, verification, config
//! - [`ui`] - Output formatting, prompts, and tree rendering
//!
//! # Correctness Invariants
//!
//! Cadastre maintains the following invariants:
//!
//! 1. Every child sits below its parent's level; moves may skip levels
//! 2. The hierarchy is acyclic and every node has exactly one owner
//! 3. A move either fully happens or leaves the tree untouched
//! 4. A request is resolved at most once, so an approval never moves twice

pub mod cli;
pub mod core;
pub mod engine;
pub mod ui;
