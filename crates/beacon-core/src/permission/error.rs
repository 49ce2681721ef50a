//! Permission state machine error types.

use thiserror::Error;

use super::state::PermissionState;

/// Errors that can occur when driving the permission state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// Attempted an invalid state transition.
    #[error("invalid transition from {from} via {input}")]
    InvalidTransition {
        /// The state the machine was in.
        from: PermissionState,
        /// The input that was rejected.
        input: &'static str,
    },
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_invalid_transition_display() {
        let err = PermissionError::InvalidTransition {
            from: PermissionState::Granted,
            input: "resolve",
        };
        assert_eq!(err.to_string(), "invalid transition from granted via resolve");
    }
}
