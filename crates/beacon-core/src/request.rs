//! Stream request configuration and validation.
//!
//! A [`StreamRequest`] is the caller-supplied configuration for one location
//! stream activation: how often the provider should report, the floor below
//! which reports are unwanted, and the precision tier. It is immutable for
//! the life of the activation; changing parameters means activating again.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum accepted reporting interval (1 hour).
///
/// Platform providers silently clamp or ignore absurd intervals; rejecting
/// them here keeps misconfiguration visible.
pub const MAX_INTERVAL_MS: i64 = 3_600_000;

/// Default desired reporting interval (5 seconds).
pub const DEFAULT_DESIRED_INTERVAL_MS: i64 = 5_000;

/// Default minimum reporting interval (2 seconds).
pub const DEFAULT_MIN_INTERVAL_MS: i64 = 2_000;

/// Precision tier requested from the location provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// GNSS-backed, highest power draw.
    HighAccuracy,
    /// Network/fused positioning, battery-friendly.
    Balanced,
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighAccuracy => f.write_str("high_accuracy"),
            Self::Balanced => f.write_str("balanced"),
        }
    }
}

/// Errors that can occur during stream request validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestValidationError {
    /// The desired interval is zero or negative.
    #[error("desired interval must be positive, got {value_ms}ms")]
    NonPositiveDesiredInterval {
        /// The rejected value.
        value_ms: i64,
    },

    /// The minimum interval is zero or negative.
    #[error("minimum interval must be positive, got {value_ms}ms")]
    NonPositiveMinInterval {
        /// The rejected value.
        value_ms: i64,
    },

    /// An interval exceeds [`MAX_INTERVAL_MS`].
    #[error("interval {value_ms}ms exceeds maximum {max_ms}ms")]
    IntervalTooLong {
        /// The rejected value.
        value_ms: i64,
        /// The maximum allowed interval.
        max_ms: i64,
    },

    /// The minimum interval exceeds the desired interval.
    #[error("minimum interval {min_ms}ms exceeds desired interval {desired_ms}ms")]
    MinExceedsDesired {
        /// The minimum interval.
        min_ms: i64,
        /// The desired interval.
        desired_ms: i64,
    },
}

/// Configuration for one location stream activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamRequest {
    /// Preferred interval between provider reports, in milliseconds.
    pub desired_interval_ms: i64,

    /// Floor below which reports are unwanted, in milliseconds.
    pub min_interval_ms: i64,

    /// Requested precision tier.
    pub precision: Precision,
}

impl StreamRequest {
    /// Creates a new stream request.
    #[must_use]
    pub const fn new(desired_interval_ms: i64, min_interval_ms: i64, precision: Precision) -> Self {
        Self {
            desired_interval_ms,
            min_interval_ms,
            precision,
        }
    }

    /// Validates the interval bounds.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestValidationError`] describing the first failed
    /// bound.
    pub fn validate(&self) -> Result<(), RequestValidationError> {
        if self.desired_interval_ms <= 0 {
            return Err(RequestValidationError::NonPositiveDesiredInterval {
                value_ms: self.desired_interval_ms,
            });
        }
        if self.min_interval_ms <= 0 {
            return Err(RequestValidationError::NonPositiveMinInterval {
                value_ms: self.min_interval_ms,
            });
        }
        if self.desired_interval_ms > MAX_INTERVAL_MS {
            return Err(RequestValidationError::IntervalTooLong {
                value_ms: self.desired_interval_ms,
                max_ms: MAX_INTERVAL_MS,
            });
        }
        if self.min_interval_ms > self.desired_interval_ms {
            return Err(RequestValidationError::MinExceedsDesired {
                min_ms: self.min_interval_ms,
                desired_ms: self.desired_interval_ms,
            });
        }
        Ok(())
    }
}

impl Default for StreamRequest {
    fn default() -> Self {
        Self {
            desired_interval_ms: DEFAULT_DESIRED_INTERVAL_MS,
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            precision: Precision::HighAccuracy,
        }
    }
}
