//! core
//!
//! Core domain types, schemas, and operations for Cadastre.
//!
//! # Modules
//!
//! - [`types`] - Strong types: NodeId, NodeKind, Resources, etc.
//! - [`tree`] - Location hierarchy and the subtree move primitive
//! - [`code`] - Positional transfer codes
//! - [`selection`] - Cascading path selection and transfer drafts
//! - [`request`] - Transfer requests and their ledger
//! - [`error`] - Errors surfaced by moves and the workflow
//! - [`verify`] - Fast verification of hierarchy invariants
//! - [`seed`] - Deterministic sample hierarchy
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - All verification is deterministic
//! - Nothing in core locks, blocks, or prints

pub mod code;
pub mod config;
pub mod error;
pub mod request;
pub mod seed;
pub mod selection;
pub mod tree;
pub mod types;
pub mod verify;
