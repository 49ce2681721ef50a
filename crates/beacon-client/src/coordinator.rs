//! Session-scoped coordinator wiring.
//!
//! The [`SignalCoordinator`] assembles the gate, stream, store, dispatcher,
//! and resolver for one foreground client session. It owns no logic of its
//! own beyond wiring and the two session-level verbs: `shutdown` (cancel
//! the live stream registration) and `sign_out` (clear the pending slot).

use std::sync::Arc;

use beacon_core::request::StreamRequest;

use crate::config::CoordinatorConfig;
use crate::dispatch::NotificationDispatcher;
use crate::gate::PermissionGate;
use crate::provider::{AlertSink, LocationProvider, NavigationSink, PermissionProvider};
use crate::resolver::DeepLinkResolver;
use crate::store::{PendingEventStore, StoreError};
use crate::stream::{ActivateError, FixStream, LocationStream};

/// The platform implementations a coordinator is built over.
pub struct Providers {
    /// Platform permission provider.
    pub permission: Arc<dyn PermissionProvider>,

    /// Platform location provider.
    pub location: Arc<dyn LocationProvider>,

    /// Local alert surface.
    pub alerts: Arc<dyn AlertSink>,

    /// UI navigation surface.
    pub navigation: Arc<dyn NavigationSink>,
}

/// Coordinates the signals of one foreground client session.
pub struct SignalCoordinator {
    config: CoordinatorConfig,
    gate: Arc<PermissionGate>,
    stream: LocationStream,
    store: Arc<PendingEventStore>,
    dispatcher: NotificationDispatcher,
    resolver: DeepLinkResolver,
}

impl SignalCoordinator {
    /// Wires a coordinator from configuration and platform providers.
    #[must_use]
    pub fn new(config: CoordinatorConfig, providers: Providers) -> Self {
        let gate = Arc::new(PermissionGate::new(providers.permission));
        let stream = LocationStream::new(providers.location, gate.watch());
        let store = Arc::new(PendingEventStore::new(&config.store_dir));
        let dispatcher = NotificationDispatcher::new(
            Arc::clone(&store),
            providers.alerts,
            config.alert_channel.clone(),
        );
        let resolver = DeepLinkResolver::new(Arc::clone(&store), providers.navigation);
        Self {
            config,
            gate,
            stream,
            store,
            dispatcher,
            resolver,
        }
    }

    /// Returns the permission gate.
    #[must_use]
    pub fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    /// Returns the pending event store.
    #[must_use]
    pub fn store(&self) -> &PendingEventStore {
        &self.store
    }

    /// Returns the notification dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// Returns the deep-link resolver.
    #[must_use]
    pub const fn resolver(&self) -> &DeepLinkResolver {
        &self.resolver
    }

    /// Activates a location stream with the configured default request.
    ///
    /// # Errors
    ///
    /// See [`LocationStream::activate`].
    pub fn activate_location(&self) -> Result<FixStream, ActivateError> {
        self.stream.activate(self.config.default_stream_request())
    }

    /// Activates a location stream with an explicit request.
    ///
    /// # Errors
    ///
    /// See [`LocationStream::activate`].
    pub fn activate_location_with(&self, request: StreamRequest) -> Result<FixStream, ActivateError> {
        self.stream.activate(request)
    }

    /// Cancels the live location registration, if any. The consumer's
    /// stream ends without error.
    pub fn shutdown(&self) {
        self.stream.shutdown();
    }

    /// Clears the pending slot. Used on sign-out.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from the slot clear.
    pub fn sign_out(&self) -> Result<(), StoreError> {
        self.store.clear()
    }
}

impl std::fmt::Debug for SignalCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalCoordinator")
            .field("permission", &self.gate.current_state())
            .finish_non_exhaustive()
    }
}
