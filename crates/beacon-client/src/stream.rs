//! Location stream: callback-to-channel adaptation.
//!
//! [`LocationStream`] adapts the platform provider's callback registration
//! into a cancellable channel of deduplicated [`LocationFix`] values. Each
//! activation is an independent stream instance; at most one registration is
//! live per stream, and a second activation cancels the first
//! (last-activator-wins).
//!
//! # Teardown
//!
//! The provider registration is a guaranteed-release scoped resource. A
//! pump task owns an RAII guard whose drop deregisters the callback, so
//! every exit path releases it exactly once:
//!
//! - the consumer drops its [`FixStream`] (detected even before any fix is
//!   delivered);
//! - the permission gate leaves `Granted`;
//! - the coordinator requests shutdown or a newer activation supersedes
//!   this one;
//! - the provider closes its side of the callback channel.
//!
//! Teardown is not an error: a torn-down stream simply stops producing.

// Mutex poisoning indicates a panic in another thread, which is unrecoverable.
#![allow(clippy::missing_panics_doc)]

use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use beacon_core::fix::{DuplicateFilter, LocationFix};
use beacon_core::permission::PermissionState;
use beacon_core::request::{RequestValidationError, StreamRequest};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace};

use crate::provider::{FixSink, LocationProvider, RegistrationError, RegistrationHandle};

/// Capacity of the consumer-facing fix channel.
///
/// The provider side is unbounded (backpressure-free push); this bound only
/// covers a consumer that is momentarily behind.
pub const FIX_CHANNEL_CAPACITY: usize = 64;

/// Consumer end of one stream activation.
///
/// `recv().await` yields fixes in provider-callback order with consecutive
/// duplicates suppressed; `None` means the stream was torn down. Dropping
/// the receiver detaches the consumer and releases the registration.
pub type FixStream = mpsc::Receiver<LocationFix>;

/// Errors that can occur when activating a location stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ActivateError {
    /// The stream request failed validation.
    #[error("invalid stream request: {0}")]
    InvalidRequest(#[from] RequestValidationError),

    /// The permission gate is not in `Granted`.
    #[error("location permission not granted (current state: {state})")]
    PermissionNotGranted {
        /// The gate's state at activation time.
        state: PermissionState,
    },

    /// The provider refused the registration. Terminal for this activation;
    /// the caller may activate again.
    #[error("provider registration failed: {0}")]
    Registration(#[from] RegistrationError),
}

impl ActivateError {
    /// Returns the error kind as a string identifier.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::PermissionNotGranted { .. } => "permission_not_granted",
            Self::Registration(_) => "registration",
        }
    }
}

/// Deregisters the provider registration on drop.
///
/// Owned by the pump task, so the registration is released on every pump
/// exit path, including task abort.
struct DeregistrationGuard {
    provider: Arc<dyn LocationProvider>,
    handle: Option<RegistrationHandle>,
}

impl Drop for DeregistrationGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            trace!(handle = handle.id(), "deregistering location callback");
            self.provider.deregister(handle);
        }
    }
}

/// Produces deduplicated location fix streams for a single session.
pub struct LocationStream {
    provider: Arc<dyn LocationProvider>,
    gate_rx: watch::Receiver<PermissionState>,
    /// Cancel signal for the live activation, if any.
    active: StdMutex<Option<watch::Sender<bool>>>,
}

impl LocationStream {
    /// Creates a stream source over `provider`, guarded by the permission
    /// gate's watch channel.
    #[must_use]
    pub fn new(
        provider: Arc<dyn LocationProvider>,
        gate_rx: watch::Receiver<PermissionState>,
    ) -> Self {
        Self {
            provider,
            gate_rx,
            active: StdMutex::new(None),
        }
    }

    /// Activates a new fix stream under `request`.
    ///
    /// Any previously live activation is cancelled first
    /// (last-activator-wins). The returned [`FixStream`] is lazy and
    /// unbounded: it produces nothing until the provider delivers, and ends
    /// without error on teardown.
    ///
    /// # Errors
    ///
    /// - [`ActivateError::InvalidRequest`] when the request's bounds are
    ///   invalid;
    /// - [`ActivateError::PermissionNotGranted`] when the gate is not in
    ///   `Granted`;
    /// - [`ActivateError::Registration`] when the provider refuses the
    ///   callback registration. Not retried internally.
    pub fn activate(&self, request: StreamRequest) -> Result<FixStream, ActivateError> {
        request.validate()?;

        let state = *self.gate_rx.borrow();
        if !state.is_granted() {
            return Err(ActivateError::PermissionNotGranted { state });
        }

        // Last-activator-wins: cancel the previous pump before registering
        // the new callback, so at most one registration is live.
        self.cancel_active();

        let (raw_tx, raw_rx) = mpsc::unbounded_channel::<Vec<LocationFix>>();
        let sink: FixSink = Arc::new(move |fixes| {
            // Send failure means the pump is gone; the provider is about to
            // be deregistered, so late deliveries are dropped.
            let _ = raw_tx.send(fixes);
        });

        let handle = self.provider.register(&request, sink)?;
        debug!(
            handle = handle.id(),
            desired_interval_ms = request.desired_interval_ms,
            min_interval_ms = request.min_interval_ms,
            precision = %request.precision,
            "location callback registered"
        );

        let guard = DeregistrationGuard {
            provider: Arc::clone(&self.provider),
            handle: Some(handle),
        };

        let (cancel_tx, cancel_rx) = watch::channel(false);
        *self.active.lock().expect("lock poisoned") = Some(cancel_tx);

        let (out_tx, out_rx) = mpsc::channel(FIX_CHANNEL_CAPACITY);
        tokio::spawn(pump(guard, raw_rx, out_tx, self.gate_rx.clone(), cancel_rx));

        Ok(out_rx)
    }

    /// Cancels the live activation, if any, within one scheduling step.
    ///
    /// Cancellation is not an error: the consumer's stream simply ends.
    pub fn shutdown(&self) {
        self.cancel_active();
    }

    fn cancel_active(&self) {
        if let Some(cancel) = self.active.lock().expect("lock poisoned").take() {
            let _ = cancel.send(true);
        }
    }
}

impl std::fmt::Debug for LocationStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let live = self.active.lock().expect("lock poisoned").is_some();
        f.debug_struct("LocationStream")
            .field("live", &live)
            .finish_non_exhaustive()
    }
}

/// Forwards provider deliveries to the consumer until torn down.
async fn pump(
    guard: DeregistrationGuard,
    mut raw_rx: mpsc::UnboundedReceiver<Vec<LocationFix>>,
    out_tx: mpsc::Sender<LocationFix>,
    mut gate_rx: watch::Receiver<PermissionState>,
    mut cancel_rx: watch::Receiver<bool>,
) {
    // Dropping the guard on any exit path below deregisters the callback.
    let _guard = guard;
    // Close the race between the activation-time permission check and this
    // task starting: a revocation in that window must still tear down.
    if !gate_rx.borrow_and_update().is_granted() {
        return;
    }
    let mut filter = DuplicateFilter::new();
    loop {
        tokio::select! {
            batch = raw_rx.recv() => {
                // None: the provider-side sender is gone.
                let Some(batch) = batch else { break };
                // An empty batch is "no usable fix", not an error.
                for fix in batch {
                    if let Some(fix) = filter.admit(fix) {
                        if out_tx.send(fix).await.is_err() {
                            // Consumer detached mid-forward.
                            return;
                        }
                    }
                }
            },
            changed = gate_rx.changed() => {
                if changed.is_err() || !gate_rx.borrow_and_update().is_granted() {
                    debug!("permission left granted, ending location stream");
                    break;
                }
            },
            changed = cancel_rx.changed() => {
                if changed.is_err() || *cancel_rx.borrow_and_update() {
                    debug!("location stream cancelled");
                    break;
                }
            },
            () = out_tx.closed() => {
                // Consumer detached, possibly before any fix arrived.
                break;
            },
        }
    }
}
