//! Permission lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of the continuous-location permission.
///
/// Exactly one instance exists per client session, owned by the permission
/// gate. See the module documentation for the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    /// The permission has never been requested this install.
    Unrequested,

    /// A request is in flight with the platform permission provider.
    Requesting,

    /// The permission is granted; location streaming may run.
    Granted,

    /// The permission was denied but the user can still be asked again.
    Denied,

    /// The permission was denied and no further rationale prompt is
    /// possible. The only recovery path is the system settings screen.
    PermanentlyDenied,
}

impl PermissionState {
    /// Returns the state name as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unrequested => "unrequested",
            Self::Requesting => "requesting",
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::PermanentlyDenied => "permanently_denied",
        }
    }

    /// Returns `true` if location streaming may run in this state.
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }

    /// Returns `true` for a denial that a fresh in-app ask can still
    /// overturn.
    #[must_use]
    pub const fn is_retriable_denial(self) -> bool {
        matches!(self, Self::Denied)
    }

    /// Returns `true` when only a trip to the system settings screen can
    /// recover the permission.
    #[must_use]
    pub const fn requires_settings_change(self) -> bool {
        matches!(self, Self::PermanentlyDenied)
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
