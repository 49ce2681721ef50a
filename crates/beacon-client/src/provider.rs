//! Platform provider and sink traits.
//!
//! These traits are the boundary between the coordinator and the opaque
//! platform services it consumes. Production code wires in thin wrappers
//! over the platform SDKs; tests wire in in-memory fakes. The coordinator
//! never talks to a platform API except through these traits.
//!
//! # Boundary Shape
//!
//! - [`PermissionProvider`]: one asynchronous ask, resolving to a grant flag
//!   plus a "rationale still showable" flag.
//! - [`LocationProvider`]: callback registration. The provider invokes the
//!   registered [`FixSink`] with zero-or-more fixes per delivery and stops
//!   after `deregister`.
//! - [`AlertSink`] / [`NavigationSink`]: outbound one-way surfaces for the
//!   locally displayed alert and the UI navigation jump.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use beacon_core::fix::LocationFix;
use beacon_core::request::StreamRequest;
use thiserror::Error;

/// Boxed future returned by provider trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Callback handed to the location provider.
///
/// Invoked with zero-or-more fixes per delivery; an empty batch means the
/// provider had no usable fix, which is not an error. The callback must be
/// cheap and non-blocking - providers deliver from their own threads.
pub type FixSink = Arc<dyn Fn(Vec<LocationFix>) + Send + Sync>;

/// The permission being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PermissionKind {
    /// Continuous location while the app is in the foreground.
    Location,
}

impl fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Location => f.write_str("location"),
        }
    }
}

/// Outcome of one permission ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionResponse {
    /// Whether the permission is now granted.
    pub granted: bool,

    /// Whether the platform would still show a rationale prompt for a
    /// further ask. `false` together with a denial means the user must go
    /// through system settings.
    pub can_show_rationale_again: bool,
}

/// Errors from the platform permission provider.
///
/// The gate maps these to a retryable denial; they are logged, never
/// silently dropped.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PermissionProviderError {
    /// The provider failed to deliver a verdict.
    #[error("permission provider failed: {reason}")]
    Failed {
        /// Description of the failure.
        reason: String,
    },
}

impl PermissionProviderError {
    /// Create a provider failure error.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

/// Asynchronous platform permission provider.
pub trait PermissionProvider: Send + Sync {
    /// Asks the platform for the permission, resolving when the user (or an
    /// immediate platform fast path) produces a verdict.
    fn request_permission(
        &self,
        kind: PermissionKind,
    ) -> BoxFuture<'_, Result<PermissionResponse, PermissionProviderError>>;
}

/// Opaque handle identifying one live provider registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationHandle(u64);

impl RegistrationHandle {
    /// Creates a handle from a provider-assigned id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the provider-assigned id.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Errors from location provider registration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistrationError {
    /// The provider refused or failed the registration.
    #[error("location registration failed: {reason}")]
    Failed {
        /// Description of the failure.
        reason: String,
    },
}

impl RegistrationError {
    /// Create a registration failure error.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

/// Callback-based platform location provider.
pub trait LocationProvider: Send + Sync {
    /// Registers `sink` for continuous fix delivery under `request`'s
    /// interval and precision parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] when the provider cannot accept the
    /// registration. Registration failures are terminal for one activation;
    /// retry policy belongs to the caller.
    fn register(
        &self,
        request: &StreamRequest,
        sink: FixSink,
    ) -> Result<RegistrationHandle, RegistrationError>;

    /// Stops delivery for a previous registration.
    ///
    /// Must be idempotent at the provider: deregistering an unknown handle
    /// is a no-op.
    fn deregister(&self, handle: RegistrationHandle);
}

/// A locally displayed alert whose tap intent carries the event id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventAlert {
    /// Identifier of the event the alert deep-links to.
    pub event_id: String,

    /// Alert title; may be empty.
    pub title: String,

    /// Alert body; may be empty.
    pub body: String,

    /// Platform notification channel the alert is posted on.
    pub channel: String,
}

/// Posts locally visible alerts.
pub trait AlertSink: Send + Sync {
    /// Displays `alert`. Best-effort: the platform may suppress it.
    fn post_alert(&self, alert: EventAlert);
}

/// Moves the UI to an event's detail view.
pub trait NavigationSink: Send + Sync {
    /// Navigates to the event identified by `event_id`.
    fn navigate_to_event(&self, event_id: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_kind_display() {
        assert_eq!(PermissionKind::Location.to_string(), "location");
    }

    #[test]
    fn test_registration_handle_accessors() {
        let handle = RegistrationHandle::new(42);
        assert_eq!(handle.id(), 42);
        assert_eq!(handle, RegistrationHandle::new(42));
    }

    #[test]
    fn test_provider_error_constructors() {
        let err = PermissionProviderError::failed("service disconnected");
        assert!(err.to_string().contains("service disconnected"));

        let err = RegistrationError::failed("too many listeners");
        assert!(err.to_string().contains("too many listeners"));
    }
}
