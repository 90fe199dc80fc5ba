//! engine::events
//!
//! Push notifications emitted by the engine.
//!
//! # Channels
//!
//! - [`LocationsObserver`]: fired after every successful hierarchy mutation
//!   with the newly published snapshot
//! - [`AlertSink`]: fire-and-forget alerts from workflow operations
//!
//! Callbacks run on the thread that performed the mutation, after the
//! store's own locks are released. A callback may read from the store but
//! must not mutate it.
//!
//! # Example
//!
//! ```
//! use cadastre::engine::events::{Alert, AlertKind, AlertSink, RecordingSink};
//!
//! let sink = RecordingSink::new();
//! sink.alert(Alert::new(AlertKind::Info, "Selection Cleared", "Deselected c1"));
//! assert_eq!(sink.alerts().len(), 1);
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::core::config::DEFAULT_ALERT_DURATION_MS;

use super::store::LocationsSnapshot;

/// Severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Info,
    Success,
    Warning,
    Error,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::Info => "info",
            AlertKind::Success => "success",
            AlertKind::Warning => "warning",
            AlertKind::Error => "error",
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub description: String,
    pub duration_ms: u64,
}

impl Alert {
    /// An alert shown for the default 5000 ms.
    pub fn new(kind: AlertKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            duration_ms: DEFAULT_ALERT_DURATION_MS,
        }
    }

    /// Override how long the alert stays up.
    pub fn lasting(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// Receives snapshots after hierarchy mutations.
pub trait LocationsObserver: Send + Sync {
    /// Called once per published snapshot, in increasing version order.
    fn on_locations_changed(&self, snapshot: &LocationsSnapshot);
}

/// Receives alerts requested by workflow operations.
pub trait AlertSink: Send + Sync {
    fn alert(&self, alert: Alert);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AlertSink for NullSink {
    fn alert(&self, _alert: Alert) {}
}

/// Collects alerts and snapshot versions in memory.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share
/// the same recording.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<Recorded>>,
}

#[derive(Debug, Default)]
struct Recorded {
    alerts: Vec<Alert>,
    versions: Vec<u64>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every alert received so far, oldest first.
    pub fn alerts(&self) -> Vec<Alert> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .alerts
            .clone()
    }

    /// Alerts of one kind, oldest first.
    pub fn alerts_of(&self, kind: AlertKind) -> Vec<Alert> {
        self.alerts().into_iter().filter(|a| a.kind == kind).collect()
    }

    /// Versions of every snapshot observed, in delivery order.
    pub fn versions(&self) -> Vec<u64> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .versions
            .clone()
    }

    /// Forget everything recorded.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.alerts.clear();
        inner.versions.clear();
    }
}

impl AlertSink for RecordingSink {
    fn alert(&self, alert: Alert) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .alerts
            .push(alert);
    }
}

impl LocationsObserver for RecordingSink {
    fn on_locations_changed(&self, snapshot: &LocationsSnapshot) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .versions
            .push(snapshot.version);
    }
}
