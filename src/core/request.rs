//! core::request
//!
//! Transfer requests and the append-only ledger that holds them.
//!
//! # Lifecycle
//!
//! ```text
//! pending --approve--> approved   (terminal)
//! pending --reject---> rejected   (terminal)
//! ```
//!
//! Requests are never removed. Queries filter by status instead, so the
//! ledger doubles as an audit trail.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::code::TransferCodes;
use super::error::TransferError;
use super::types::{NodeId, UtcTimestamp};

/// Unique identifier for a transfer request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new unique request id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create a RequestId from an existing string.
    ///
    /// Used when ids come back from a caller (CLI argument, UI event).
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for compact display.
    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to relocate one node beneath another.
///
/// Node ids are references into the hierarchy; the hierarchy owns the
/// nodes themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub id: RequestId,
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub status: RequestStatus,
    pub requested_at: UtcTimestamp,
    /// Set exactly once, on leaving `pending`
    pub resolved_at: Option<UtcTimestamp>,
    pub requested_by: String,
    pub reason: String,
    /// Captured at submission, never changed afterwards
    pub transfer_resources: bool,
    /// Positional codes, when the request came from a path selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codes: Option<TransferCodes>,
}

impl TransferRequest {
    /// Build a fresh pending request.
    pub fn pending(
        source_id: NodeId,
        target_id: NodeId,
        requested_by: impl Into<String>,
        reason: impl Into<String>,
        transfer_resources: bool,
    ) -> Self {
        Self {
            id: RequestId::new(),
            source_id,
            target_id,
            status: RequestStatus::Pending,
            requested_at: UtcTimestamp::now(),
            resolved_at: None,
            requested_by: requested_by.into(),
            reason: reason.into(),
            transfer_resources,
            codes: None,
        }
    }

    /// Attach positional codes for audit display.
    pub fn with_codes(mut self, codes: TransferCodes) -> Self {
        self.codes = Some(codes);
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

/// Append-only collection of requests in submission order.
#[derive(Debug, Clone, Default)]
pub struct RequestLedger {
    requests: Vec<TransferRequest>,
}

impl RequestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request. Its position fixes its place in every listing.
    pub fn append(&mut self, request: TransferRequest) {
        self.requests.push(request);
    }

    pub fn get(&self, id: &RequestId) -> Option<&TransferRequest> {
        self.requests.iter().find(|r| &r.id == id)
    }

    /// Look up a request that must still be pending.
    ///
    /// # Errors
    ///
    /// `RequestNotFound` if absent, `AlreadyResolved` if terminal.
    pub fn pending_request(&self, id: &RequestId) -> Result<&TransferRequest, TransferError> {
        let request = self
            .get(id)
            .ok_or_else(|| TransferError::RequestNotFound(id.clone()))?;
        if request.status.is_terminal() {
            return Err(TransferError::AlreadyResolved {
                id: id.clone(),
                status: request.status.to_string(),
            });
        }
        Ok(request)
    }

    /// Move a pending request into a terminal status and stamp `resolved_at`.
    ///
    /// # Errors
    ///
    /// Same as [`pending_request`](Self::pending_request). Asking for
    /// `Pending` is rejected as a validation error.
    pub fn resolve(
        &mut self,
        id: &RequestId,
        status: RequestStatus,
    ) -> Result<&TransferRequest, TransferError> {
        if !status.is_terminal() {
            return Err(TransferError::validation(
                "a request can only be resolved to approved or rejected",
            ));
        }
        self.pending_request(id)?;

        let request = self
            .requests
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| TransferError::RequestNotFound(id.clone()))?;
        request.status = status;
        request.resolved_at = Some(UtcTimestamp::now());
        Ok(request)
    }

    /// Every request, in submission order.
    pub fn all(&self) -> &[TransferRequest] {
        &self.requests
    }

    /// Requests with the given status, in submission order.
    pub fn by_status(&self, status: RequestStatus) -> Vec<&TransferRequest> {
        self.requests.iter().filter(|r| r.status == status).collect()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(source: &str, target: &str) -> TransferRequest {
        TransferRequest::pending(
            NodeId::new(source).unwrap(),
            NodeId::new(target).unwrap(),
            "admin",
            "rebalance",
            false,
        )
    }

    #[test]
    fn new_requests_are_pending() {
        let r = request("s-c1-1", "c2");
        assert!(r.is_pending());
        assert!(r.resolved_at.is_none());
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn resolve_stamps_once() {
        let mut ledger = RequestLedger::new();
        let r = request("s-c1-1", "c2");
        let id = r.id.clone();
        ledger.append(r);

        let resolved = ledger.resolve(&id, RequestStatus::Rejected).unwrap();
        assert_eq!(resolved.status, RequestStatus::Rejected);
        let stamped = resolved.resolved_at.clone();
        assert!(stamped.is_some());

        let err = ledger.resolve(&id, RequestStatus::Approved).unwrap_err();
        assert!(matches!(err, TransferError::AlreadyResolved { .. }));
        assert_eq!(ledger.get(&id).unwrap().resolved_at, stamped);
        assert_eq!(ledger.get(&id).unwrap().status, RequestStatus::Rejected);
    }

    #[test]
    fn resolve_to_pending_rejected() {
        let mut ledger = RequestLedger::new();
        let r = request("s-c1-1", "c2");
        let id = r.id.clone();
        ledger.append(r);
        assert!(matches!(
            ledger.resolve(&id, RequestStatus::Pending),
            Err(TransferError::ValidationError(_))
        ));
        assert!(ledger.get(&id).unwrap().is_pending());
    }

    #[test]
    fn unknown_request() {
        let mut ledger = RequestLedger::new();
        let id = RequestId::from_string("missing");
        assert_eq!(
            ledger.resolve(&id, RequestStatus::Approved).unwrap_err(),
            TransferError::RequestNotFound(id)
        );
    }

    #[test]
    fn listings_keep_submission_order() {
        let mut ledger = RequestLedger::new();
        let ids: Vec<_> = ["s-c1-1", "s-c1-2", "s-c1-3"]
            .iter()
            .map(|s| {
                let r = request(s, "c2");
                let id = r.id.clone();
                ledger.append(r);
                id
            })
            .collect();

        ledger.resolve(&ids[1], RequestStatus::Approved).unwrap();

        let pending: Vec<_> = ledger
            .by_status(RequestStatus::Pending)
            .iter()
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(pending, vec![ids[0].clone(), ids[2].clone()]);
        assert_eq!(ledger.all().len(), 3);
        assert_eq!(ledger.by_status(RequestStatus::Approved).len(), 1);
    }

    #[test]
    fn serde_roundtrip() {
        let r = request("s-c1-1", "c2");
        let json = serde_json::to_string(&r).unwrap();
        let parsed: TransferRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(r, parsed);
        assert!(json.contains("\"status\":\"pending\""));
    }
}
