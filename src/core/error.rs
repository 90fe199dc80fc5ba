//! core::error
//!
//! Errors surfaced by moves and by the transfer workflow.
//!
//! Every variant is recoverable: callers are expected to re-select or
//! re-prompt. Nothing here is fatal to the process.

use thiserror::Error;

use super::request::RequestId;
use super::types::{NodeId, NodeKind};

/// Errors from structural moves and request handling.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    /// A node id did not resolve in the hierarchy.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Self-move, or a move into the source's own subtree.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// The target does not sit above the source's level.
    #[error("cannot place {source_kind} '{source_id}' under {target_kind} '{target_id}'")]
    LevelMismatch {
        source_id: NodeId,
        source_kind: NodeKind,
        target_id: NodeId,
        target_kind: NodeKind,
    },

    /// No request with this id exists.
    #[error("transfer request not found: {0}")]
    RequestNotFound(RequestId),

    /// The request was already approved or rejected.
    #[error("transfer request {id} is already {status}")]
    AlreadyResolved { id: RequestId, status: String },

    /// Submission input failed validation.
    #[error("validation failed: {0}")]
    ValidationError(String),
}

impl TransferError {
    /// Convenience constructor for validation failures.
    pub fn validation(message: impl Into<String>) -> Self {
        TransferError::ValidationError(message.into())
    }

    /// Short title suitable for an alert headline.
    pub fn title(&self) -> &'static str {
        match self {
            TransferError::NodeNotFound(_) => "Location Not Found",
            TransferError::InvalidMove(_) => "Invalid Move",
            TransferError::LevelMismatch { .. } => "Level Mismatch",
            TransferError::RequestNotFound(_) => "Request Not Found",
            TransferError::AlreadyResolved { .. } => "Already Resolved",
            TransferError::ValidationError(_) => "Invalid Request",
        }
    }
}
