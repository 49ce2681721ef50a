//! Shared in-memory fakes for the integration tests.
//!
//! Each fake records what it was asked to do so scenario tests can assert
//! on provider interactions (registrations released, alerts posted,
//! navigation performed) without any platform dependency.

#![allow(dead_code)] // Not every scenario file uses every fake.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use beacon_client::provider::{
    AlertSink, BoxFuture, EventAlert, FixSink, LocationProvider, NavigationSink, PermissionKind,
    PermissionProvider, PermissionProviderError, PermissionResponse, RegistrationError,
    RegistrationHandle,
};
use beacon_core::fix::LocationFix;
use beacon_core::request::StreamRequest;

/// Initializes test logging once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Permission provider replaying scripted responses in order.
pub struct ScriptedPermissionProvider {
    responses: Mutex<Vec<Result<PermissionResponse, PermissionProviderError>>>,
    asks: AtomicUsize,
}

impl ScriptedPermissionProvider {
    pub fn new(responses: Vec<Result<PermissionResponse, PermissionProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            asks: AtomicUsize::new(0),
        }
    }

    pub fn granting() -> Self {
        Self::new(vec![Ok(PermissionResponse {
            granted: true,
            can_show_rationale_again: false,
        })])
    }

    pub fn ask_count(&self) -> usize {
        self.asks.load(Ordering::SeqCst)
    }
}

impl PermissionProvider for ScriptedPermissionProvider {
    fn request_permission(
        &self,
        _kind: PermissionKind,
    ) -> BoxFuture<'_, Result<PermissionResponse, PermissionProviderError>> {
        self.asks.fetch_add(1, Ordering::SeqCst);
        let response = self.responses.lock().expect("lock poisoned").remove(0);
        Box::pin(async move { response })
    }
}

/// Location provider fake: records registrations and fans deliveries out to
/// every live sink.
#[derive(Default)]
pub struct FakeLocationProvider {
    next_id: AtomicU64,
    sinks: Mutex<Vec<(RegistrationHandle, FixSink)>>,
    registered: AtomicUsize,
    deregistered: AtomicUsize,
    fail_registration: AtomicBool,
}

impl FakeLocationProvider {
    pub fn deliver(&self, fixes: Vec<LocationFix>) {
        let sinks = self.sinks.lock().expect("lock poisoned");
        for (_, sink) in sinks.iter() {
            sink(fixes.clone());
        }
    }

    pub fn fail_next_registration(&self) {
        self.fail_registration.store(true, Ordering::SeqCst);
    }

    pub fn registered_count(&self) -> usize {
        self.registered.load(Ordering::SeqCst)
    }

    pub fn deregistered_count(&self) -> usize {
        self.deregistered.load(Ordering::SeqCst)
    }

    pub fn live_count(&self) -> usize {
        self.sinks.lock().expect("lock poisoned").len()
    }

    /// Spins until `expected` deregistrations happened, panicking after a
    /// second of scheduler yields.
    pub async fn wait_for_deregistrations(&self, expected: usize) {
        tokio::time::timeout(std::time::Duration::from_secs(1), async {
            while self.deregistered_count() < expected {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("provider registration was not released");
    }
}

impl LocationProvider for FakeLocationProvider {
    fn register(
        &self,
        _request: &StreamRequest,
        sink: FixSink,
    ) -> Result<RegistrationHandle, RegistrationError> {
        if self.fail_registration.swap(false, Ordering::SeqCst) {
            return Err(RegistrationError::failed("simulated registration failure"));
        }
        let handle = RegistrationHandle::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.sinks
            .lock()
            .expect("lock poisoned")
            .push((handle, sink));
        self.registered.fetch_add(1, Ordering::SeqCst);
        Ok(handle)
    }

    fn deregister(&self, handle: RegistrationHandle) {
        self.sinks
            .lock()
            .expect("lock poisoned")
            .retain(|(h, _)| *h != handle);
        self.deregistered.fetch_add(1, Ordering::SeqCst);
    }
}

/// Alert sink recording every posted alert.
#[derive(Default)]
pub struct RecordingAlertSink {
    alerts: Mutex<Vec<EventAlert>>,
}

impl RecordingAlertSink {
    pub fn posted(&self) -> Vec<EventAlert> {
        self.alerts.lock().expect("lock poisoned").clone()
    }
}

impl AlertSink for RecordingAlertSink {
    fn post_alert(&self, alert: EventAlert) {
        self.alerts.lock().expect("lock poisoned").push(alert);
    }
}

/// Navigation sink recording every navigation jump.
#[derive(Default)]
pub struct RecordingNavigationSink {
    targets: Mutex<Vec<String>>,
}

impl RecordingNavigationSink {
    pub fn visited(&self) -> Vec<String> {
        self.targets.lock().expect("lock poisoned").clone()
    }
}

impl NavigationSink for RecordingNavigationSink {
    fn navigate_to_event(&self, event_id: &str) {
        self.targets
            .lock()
            .expect("lock poisoned")
            .push(event_id.to_owned());
    }
}

/// Convenience: a granted/denied permission response.
pub fn grant() -> Result<PermissionResponse, PermissionProviderError> {
    Ok(PermissionResponse {
        granted: true,
        can_show_rationale_again: false,
    })
}

pub fn deny(can_show_rationale_again: bool) -> Result<PermissionResponse, PermissionProviderError> {
    Ok(PermissionResponse {
        granted: false,
        can_show_rationale_again,
    })
}
