//! Registry change detection and re-registration.
//!
//! The host does not reliably announce "the command registry was replaced",
//! so the shim reconciles by polling: each tick it fetches the live handle
//! and re-registers exactly once per observed identity change. Eventual
//! consistency via periodic reconciliation, not event subscription.

use crate::host::{HostBridge, RegistryHandle};
use crate::ingest::CommandIngest;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reconciler-owned state: the last-bound handle and how many times a
/// registration has succeeded. Mutated only from `poll()`.
#[derive(Debug, Default)]
pub struct ReconcilerState {
    last: Option<RegistryHandle>,
    generation: u64,
}

/// Periodically reconciles command registration against the host's live
/// registry handle.
pub struct RegistrationReconciler {
    host: Arc<dyn HostBridge>,
    ingest: Arc<CommandIngest>,
    state: ReconcilerState,
}

impl RegistrationReconciler {
    /// Create a reconciler with no handle observed yet.
    pub fn new(host: Arc<dyn HostBridge>, ingest: Arc<CommandIngest>) -> Self {
        Self {
            host,
            ingest,
            state: ReconcilerState::default(),
        }
    }

    /// Number of successful re-registrations so far.
    pub fn generation(&self) -> u64 {
        self.state.generation
    }

    /// The handle the shim is currently bound to, if any.
    pub fn last_handle(&self) -> Option<&RegistryHandle> {
        self.state.last.as_ref()
    }

    /// One reconciliation step.
    ///
    /// Absent handle: no-op, the host has no session yet. Identity-equal
    /// handle: no-op, already bound. Identity-different handle: bind; state
    /// advances only on success, so a failed bind is retried against the
    /// same handle next tick. Never double-registers a handle and never
    /// lets a failure escape to the schedule.
    pub fn poll(&mut self) {
        let handle = match self.host.current_registry() {
            Some(handle) => handle,
            None => {
                debug!("no command registry available yet");
                return;
            }
        };

        if self
            .state
            .last
            .as_ref()
            .is_some_and(|last| last.same_instance(&handle))
        {
            return;
        }

        match self.ingest.bind(&handle) {
            Ok(()) => {
                self.state.last = Some(handle);
                self.state.generation += 1;
                info!(
                    generation = self.state.generation,
                    "bound to new command registry handle"
                );
            }
            Err(e) => {
                warn!(error = %e, "registration failed, retrying next poll");
            }
        }
    }
}
