//! Permission gate: acquisition flow and state-change publication.
//!
//! The [`PermissionGate`] owns the session's permission state machine and
//! arbitrates every ask against the platform provider. It publishes each
//! **distinct** transition on a watch channel; repeated reads of the same
//! state, and re-entries into `Requesting`, never re-notify subscribers.
//! The location stream subscribes to that channel as its activation guard.
//!
//! Provider failures are mapped to a retryable denial and logged - the gate
//! never surfaces a provider error mid-flow and never drops one silently.

use std::sync::Arc;

use beacon_core::permission::{PermissionError, PermissionMachine, PermissionState};
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use crate::provider::{PermissionKind, PermissionProvider};

/// Errors that can occur while driving the permission gate.
///
/// Denials are **not** errors: `request_access` resolves to
/// [`PermissionState::Denied`] or [`PermissionState::PermanentlyDenied`] as
/// ordinary terminal states.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GateError {
    /// The state machine rejected a transition. Indicates a wiring bug, not
    /// a user decision.
    #[error("permission machine rejected transition: {0}")]
    Machine(#[from] PermissionError),
}

/// Owns the permission state machine and arbitrates location permission
/// asks for one client session.
pub struct PermissionGate {
    provider: Arc<dyn PermissionProvider>,
    machine: Mutex<PermissionMachine>,
    state_tx: watch::Sender<PermissionState>,
}

impl PermissionGate {
    /// Creates a gate in the `Unrequested` state.
    #[must_use]
    pub fn new(provider: Arc<dyn PermissionProvider>) -> Self {
        let (state_tx, _) = watch::channel(PermissionState::Unrequested);
        Self {
            provider,
            machine: Mutex::new(PermissionMachine::new()),
            state_tx,
        }
    }

    /// Returns the current state. Never blocks.
    #[must_use]
    pub fn current_state(&self) -> PermissionState {
        *self.state_tx.borrow()
    }

    /// Subscribes to distinct state transitions.
    ///
    /// The receiver observes the state at subscription time immediately and
    /// is notified once per distinct transition thereafter.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<PermissionState> {
        self.state_tx.subscribe()
    }

    /// Requests access to continuous location.
    ///
    /// Fast path: when the state is already `Granted` the provider is not
    /// consulted and `Granted` is returned immediately. Otherwise the
    /// machine moves to `Requesting` and the provider is asked; the response
    /// resolves to `Granted`, `Denied` (retryable), or `PermanentlyDenied`
    /// (denied with the rationale prompt exhausted). Provider failures
    /// resolve to `Denied` and are logged at `warn`.
    ///
    /// Dropping the returned future mid-ask leaves the machine in
    /// `Requesting`; the next call re-enters the provider without emitting
    /// a duplicate transition.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Machine`] only when the state machine rejects a
    /// resolution, which cannot happen through this method's own locking
    /// discipline and would indicate a bug.
    pub async fn request_access(&self) -> Result<PermissionState, GateError> {
        let mut machine = self.machine.lock().await;

        if machine.state() == PermissionState::Granted {
            debug!("permission already granted, skipping provider ask");
            return Ok(PermissionState::Granted);
        }

        let (requesting, changed) = machine.begin_request();
        if changed {
            self.publish(requesting);
        }

        let resolved = match self
            .provider
            .request_permission(PermissionKind::Location)
            .await
        {
            Ok(response) => {
                machine.resolve(response.granted, response.can_show_rationale_again)?
            },
            Err(err) => {
                // Provider failures map to a retryable denial.
                warn!(error = %err, "permission provider failed, treating as denied");
                machine.resolve(false, true)?
            },
        };
        self.publish(resolved);

        if resolved.requires_settings_change() {
            warn!("location permission permanently denied, only the system settings screen can recover it");
        }
        Ok(resolved)
    }

    /// Publishes a transition, notifying subscribers only on change.
    fn publish(&self, state: PermissionState) {
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                debug!(from = %current, to = %state, "permission state transition");
                *current = state;
                true
            }
        });
    }
}

impl std::fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionGate")
            .field("state", &self.current_state())
            .finish_non_exhaustive()
    }
}
