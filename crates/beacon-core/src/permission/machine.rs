//! Permission state machine implementation.

use super::error::PermissionError;
use super::state::PermissionState;

/// The permission lifecycle state machine.
///
/// The machine is pure: it owns nothing but the current state and performs
/// no I/O. The gate in `beacon-client` drives it from provider responses and
/// publishes the resulting transitions.
#[derive(Debug, Clone)]
pub struct PermissionMachine {
    state: PermissionState,
}

impl PermissionMachine {
    /// Creates a machine in the `Unrequested` state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: PermissionState::Unrequested,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> PermissionState {
        self.state
    }

    /// Moves the machine into `Requesting`.
    ///
    /// Valid from every state: a fresh ask from `Unrequested`, or an
    /// explicit re-ask from `Granted`, `Denied`, or `PermanentlyDenied`.
    /// Calling while already `Requesting` is a re-entry, not a new
    /// transition; the returned flag is `false` so the caller does not emit
    /// a duplicate transition event.
    ///
    /// Returns `(new_state, changed)`.
    pub fn begin_request(&mut self) -> (PermissionState, bool) {
        let changed = self.state != PermissionState::Requesting;
        self.state = PermissionState::Requesting;
        (self.state, changed)
    }

    /// Resolves an in-flight request from the provider's response.
    ///
    /// A denial with the rationale prompt still showable is retryable
    /// (`Denied`); a denial with the rationale exhausted is terminal
    /// (`PermanentlyDenied`).
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::InvalidTransition`] when the machine is
    /// not in `Requesting`. This is what keeps `PermanentlyDenied`
    /// unreachable from `Granted` directly.
    pub fn resolve(
        &mut self,
        granted: bool,
        can_show_rationale_again: bool,
    ) -> Result<PermissionState, PermissionError> {
        if self.state != PermissionState::Requesting {
            return Err(PermissionError::InvalidTransition {
                from: self.state,
                input: "resolve",
            });
        }
        self.state = if granted {
            PermissionState::Granted
        } else if can_show_rationale_again {
            PermissionState::Denied
        } else {
            PermissionState::PermanentlyDenied
        };
        Ok(self.state)
    }
}

impl Default for PermissionMachine {
    fn default() -> Self {
        Self::new()
    }
}
