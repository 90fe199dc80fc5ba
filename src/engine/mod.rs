//! engine
//!
//! Shared, lock-protected state over the core domain types.
//!
//! # Architecture
//!
//! - [`store`] owns the hierarchy and publishes immutable snapshots
//! - [`workflow`] owns transfer requests and applies approved ones
//! - [`events`] defines the observer and alert channels both emit on
//!
//! [`Engine`] wires one of each together for a front end.
//!
//! # Invariants
//!
//! - Every mutation of the hierarchy goes through [`HierarchyStore`]
//! - Lock order is workflow ledger, then store
//! - Hierarchy invariants hold after every published snapshot
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use cadastre::core::config::Config;
//! use cadastre::engine::Engine;
//! use cadastre::engine::events::RecordingSink;
//!
//! let sink = Arc::new(RecordingSink::new());
//! let engine = Engine::seeded(&Config::default(), sink.clone());
//! assert!(engine.verify().ok);
//! ```

pub mod events;
pub mod store;
pub mod workflow;

pub use events::{Alert, AlertKind, AlertSink, LocationsObserver, NullSink, RecordingSink};
pub use store::{HierarchyStore, LocationsSnapshot};
pub use workflow::TransferWorkflow;

use std::sync::Arc;

use crate::core::config::Config;
use crate::core::verify::{fast_verify, VerifyResult};

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags and config.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Emit JSON instead of text.
    pub json: bool,
    /// Loaded configuration.
    pub config: Config,
}

/// A store and a workflow sharing one hierarchy.
#[derive(Debug)]
pub struct Engine {
    pub store: Arc<HierarchyStore>,
    pub workflow: TransferWorkflow,
}

impl Engine {
    /// Seed the sample hierarchy and configure alerts from `config`.
    pub fn seeded(config: &Config, alerts: Arc<dyn AlertSink>) -> Self {
        Self::with_store(Arc::new(HierarchyStore::seeded()), config, alerts)
    }

    /// Build around an existing store.
    pub fn with_store(
        store: Arc<HierarchyStore>,
        config: &Config,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        let workflow = TransferWorkflow::new(Arc::clone(&store))
            .with_alerts(alerts)
            .with_alert_duration(config.alert_duration_ms());
        Self { store, workflow }
    }

    /// Check hierarchy invariants on the current snapshot.
    pub fn verify(&self) -> VerifyResult {
        fast_verify(&self.store.snapshot().tree)
    }
}
