//! engine::workflow
//!
//! Transfer request lifecycle: submit, approve, reject.
//!
//! # State Machine
//!
//! ```text
//! pending --approve--> approved   (moves the source subtree)
//! pending --reject---> rejected   (no structural effect)
//! ```
//!
//! Both terminal states are final. A second approve or reject fails with
//! `AlreadyResolved`, so retries never repeat a move.
//!
//! # Locking
//!
//! The request ledger has its own mutex. Approval holds it across the
//! store's write lock (ledger first, then store), so the status change and
//! the move land together or not at all. Observers and alert sinks run
//! after both locks are released.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::core::config::{DEFAULT_ALERT_DURATION_MS, DEFAULT_REQUESTED_BY};
use crate::core::error::TransferError;
use crate::core::request::{RequestId, RequestLedger, RequestStatus, TransferRequest};
use crate::core::selection::{DraftPolicy, TransferDraft};
use crate::core::tree::MoveOutcome;
use crate::core::types::NodeId;

use super::events::{Alert, AlertKind, AlertSink, NullSink};
use super::store::HierarchyStore;

/// Owns pending and resolved requests and applies approved ones.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use cadastre::core::request::RequestStatus;
/// use cadastre::core::types::NodeId;
/// use cadastre::engine::store::HierarchyStore;
/// use cadastre::engine::workflow::TransferWorkflow;
///
/// let store = Arc::new(HierarchyStore::seeded());
/// let workflow = TransferWorkflow::new(Arc::clone(&store));
/// let id = |s: &str| NodeId::new(s).unwrap();
///
/// let request = workflow
///     .submit_request(&id("s-c1-1"), &id("c2"), "Admin", "rebalance", true)
///     .unwrap();
/// assert_eq!(request.status, RequestStatus::Pending);
///
/// workflow.approve(&request.id).unwrap();
/// assert_eq!(store.find_parent(&id("s-c1-1")).unwrap().id, id("c2"));
/// ```
pub struct TransferWorkflow {
    store: Arc<HierarchyStore>,
    ledger: Mutex<RequestLedger>,
    alerts: Arc<dyn AlertSink>,
    alert_duration_ms: u64,
}

impl std::fmt::Debug for TransferWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferWorkflow")
            .field("store", &self.store)
            .field("requests", &self.ledger().len())
            .field("alert_duration_ms", &self.alert_duration_ms)
            .finish()
    }
}

impl TransferWorkflow {
    /// A workflow over `store` with alerts discarded.
    pub fn new(store: Arc<HierarchyStore>) -> Self {
        Self {
            store,
            ledger: Mutex::new(RequestLedger::new()),
            alerts: Arc::new(NullSink),
            alert_duration_ms: DEFAULT_ALERT_DURATION_MS,
        }
    }

    /// Send alerts to `sink`.
    pub fn with_alerts(mut self, sink: Arc<dyn AlertSink>) -> Self {
        self.alerts = sink;
        self
    }

    /// Duration for alerts that do not ask for their own.
    pub fn with_alert_duration(mut self, duration_ms: u64) -> Self {
        self.alert_duration_ms = duration_ms;
        self
    }

    pub fn store(&self) -> &Arc<HierarchyStore> {
        &self.store
    }

    fn ledger(&self) -> MutexGuard<'_, RequestLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Send an alert through the workflow's sink.
    ///
    /// `duration_ms` of `None` uses the configured default.
    pub fn notify(
        &self,
        kind: AlertKind,
        title: &str,
        description: impl Into<String>,
        duration_ms: Option<u64>,
    ) {
        let alert = Alert::new(kind, title, description)
            .lasting(duration_ms.unwrap_or(self.alert_duration_ms));
        self.alerts.alert(alert);
    }

    fn emit(&self, kind: AlertKind, title: &str, description: String) {
        self.notify(kind, title, description, None);
    }

    fn emit_error(&self, err: &TransferError) {
        self.emit(AlertKind::Error, err.title(), err.to_string());
    }

    /// Queue a transfer of `source` beneath `target`.
    ///
    /// The reason is stored trimmed. A blank `requested_by` falls back to
    /// the default identity.
    ///
    /// # Errors
    ///
    /// `ValidationError` if the reason is blank, both ids are the same,
    /// or either id is unknown. Nothing is queued on error.
    pub fn submit_request(
        &self,
        source: &NodeId,
        target: &NodeId,
        requested_by: &str,
        reason: &str,
        transfer_resources: bool,
    ) -> Result<TransferRequest, TransferError> {
        let result = self.check_submission(source, target, reason).map(|reason| {
            TransferRequest::pending(
                source.clone(),
                target.clone(),
                identity(requested_by),
                reason,
                transfer_resources,
            )
        });
        self.enqueue(result)
    }

    /// Validate a draft against the current snapshot and queue it.
    ///
    /// The queued request carries the draft's transfer codes.
    ///
    /// # Errors
    ///
    /// Any error from [`TransferDraft::validate`].
    pub fn submit_draft(
        &self,
        draft: &TransferDraft,
        policy: DraftPolicy,
    ) -> Result<TransferRequest, TransferError> {
        let snapshot = self.store.snapshot();
        let result = draft.validate(&snapshot.tree, policy).map(|valid| {
            TransferRequest::pending(
                valid.source_id,
                valid.target_id,
                identity(&valid.requested_by),
                valid.reason,
                valid.transfer_resources,
            )
            .with_codes(valid.codes)
        });
        self.enqueue(result)
    }

    fn check_submission(
        &self,
        source: &NodeId,
        target: &NodeId,
        reason: &str,
    ) -> Result<String, TransferError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(TransferError::validation("a reason is required"));
        }
        if source == target {
            return Err(TransferError::validation(
                "source and target must be different locations",
            ));
        }
        let snapshot = self.store.snapshot();
        for id in [source, target] {
            if !snapshot.tree.contains(id) {
                return Err(TransferError::validation(format!(
                    "location '{id}' does not exist"
                )));
            }
        }
        Ok(reason.to_string())
    }

    fn enqueue(
        &self,
        result: Result<TransferRequest, TransferError>,
    ) -> Result<TransferRequest, TransferError> {
        let request = match result {
            Ok(request) => request,
            Err(err) => {
                debug!(error = %err, "submission rejected");
                self.emit_error(&err);
                return Err(err);
            }
        };

        self.ledger().append(request.clone());
        debug!(
            id = %request.id,
            source = %request.source_id,
            target = %request.target_id,
            resources = request.transfer_resources,
            "submitted transfer request"
        );
        self.emit(
            AlertKind::Success,
            "Request Submitted",
            format!(
                "Transfer of {} to {} is awaiting approval",
                request.source_id, request.target_id
            ),
        );
        Ok(request)
    }

    /// Approve a pending request and perform its move.
    ///
    /// Returns the request in its approved state.
    ///
    /// # Errors
    ///
    /// - `RequestNotFound` / `AlreadyResolved` from the ledger
    /// - Any structural error from the move, in which case the request
    ///   stays pending and the tree is unchanged
    pub fn approve(&self, id: &RequestId) -> Result<TransferRequest, TransferError> {
        let result = {
            let mut ledger = self.ledger();
            ledger.pending_request(id).cloned().and_then(|request| {
                let (outcome, snapshot) = self.store.apply_move(
                    &request.source_id,
                    &request.target_id,
                    request.transfer_resources,
                )?;
                let approved = ledger.resolve(id, RequestStatus::Approved)?.clone();
                Ok((approved, outcome, snapshot))
            })
        };

        match result {
            Ok((approved, outcome, snapshot)) => {
                self.store.publish(&snapshot);
                debug!(id = %id, version = snapshot.version, "approved transfer request");
                self.emit(AlertKind::Success, "Transfer Approved", describe_move(&outcome));
                Ok(approved)
            }
            Err(err) => {
                debug!(id = %id, error = %err, "approval failed");
                self.emit_error(&err);
                Err(err)
            }
        }
    }

    /// Reject a pending request. The hierarchy is not touched.
    ///
    /// # Errors
    ///
    /// `RequestNotFound` or `AlreadyResolved`.
    pub fn reject(&self, id: &RequestId) -> Result<TransferRequest, TransferError> {
        let result = self
            .ledger()
            .resolve(id, RequestStatus::Rejected)
            .map(|r| r.clone());

        match result {
            Ok(rejected) => {
                debug!(id = %id, "rejected transfer request");
                self.emit(
                    AlertKind::Warning,
                    "Transfer Rejected",
                    format!(
                        "Transfer of {} to {} was rejected",
                        rejected.source_id, rejected.target_id
                    ),
                );
                Ok(rejected)
            }
            Err(err) => {
                debug!(id = %id, error = %err, "rejection failed");
                self.emit_error(&err);
                Err(err)
            }
        }
    }

    /// Pending requests in submission order.
    pub fn list_pending(&self) -> Vec<TransferRequest> {
        self.list_by_status(RequestStatus::Pending)
    }

    /// Requests with `status`, in submission order.
    pub fn list_by_status(&self, status: RequestStatus) -> Vec<TransferRequest> {
        self.ledger()
            .by_status(status)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Every request in submission order.
    pub fn list_all(&self) -> Vec<TransferRequest> {
        self.ledger().all().to_vec()
    }

    pub fn get(&self, id: &RequestId) -> Option<TransferRequest> {
        self.ledger().get(id).cloned()
    }

    /// Find a request by full id or unique id prefix.
    pub fn find_by_prefix(&self, prefix: &str) -> Option<TransferRequest> {
        let ledger = self.ledger();
        let mut matches = ledger
            .all()
            .iter()
            .filter(|r| r.id.as_str().starts_with(prefix));
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(first.clone())
    }
}

fn identity(requested_by: &str) -> String {
    let trimmed = requested_by.trim();
    if trimmed.is_empty() {
        DEFAULT_REQUESTED_BY.to_string()
    } else {
        trimmed.to_string()
    }
}

fn describe_move(outcome: &MoveOutcome) -> String {
    let mut text = format!("Moved {} under {}", outcome.source, outcome.to_parent);
    if let Some(food) = outcome.merged_food {
        text.push_str(&format!(" with {food} food"));
    }
    text
}
