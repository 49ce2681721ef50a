//! Location fix value type and consecutive-duplicate suppression.
//!
//! A [`LocationFix`] is one reported location sample. Platform location
//! providers frequently redeliver the same sample (cell tower handoff,
//! passive provider coalescing), so the coordinator suppresses consecutive
//! duplicates before forwarding fixes to the consumer.
//!
//! Two fixes are *duplicates* when latitude, longitude, and accuracy are
//! bit-equal. The comparison uses `f64::to_bits`, not `==`: NaN payloads
//! compare like any other bit pattern, and `-0.0` is distinct from `0.0`.
//! The capture timestamp is excluded, so a provider re-reporting a stale
//! position with a fresh timestamp is still suppressed.

use serde::{Deserialize, Serialize};

/// One reported location sample.
///
/// Immutable once produced; the coordinator never mutates or reorders fixes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationFix {
    /// Latitude in decimal degrees.
    pub latitude: f64,

    /// Longitude in decimal degrees.
    pub longitude: f64,

    /// Estimated horizontal accuracy radius in meters.
    pub accuracy_meters: f64,

    /// Capture time in milliseconds since the Unix epoch.
    pub captured_at_epoch_ms: i64,
}

impl LocationFix {
    /// Creates a new fix.
    #[must_use]
    pub const fn new(
        latitude: f64,
        longitude: f64,
        accuracy_meters: f64,
        captured_at_epoch_ms: i64,
    ) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters,
            captured_at_epoch_ms,
        }
    }

    /// Returns `true` if this fix reports the same position and accuracy as
    /// `other`, bit-for-bit.
    ///
    /// The capture timestamp does not participate in the comparison.
    #[must_use]
    pub fn is_duplicate_of(&self, other: &Self) -> bool {
        self.latitude.to_bits() == other.latitude.to_bits()
            && self.longitude.to_bits() == other.longitude.to_bits()
            && self.accuracy_meters.to_bits() == other.accuracy_meters.to_bits()
    }
}

/// Suppresses consecutive duplicate fixes.
///
/// The filter remembers only the most recently admitted fix; there is no
/// further buffering. A fix equal to the previous *admitted* fix is dropped,
/// so `A A B A` admits `A B A` (the trailing `A` is not consecutive with the
/// first).
#[derive(Debug, Clone, Default)]
pub struct DuplicateFilter {
    last_admitted: Option<LocationFix>,
}

impl DuplicateFilter {
    /// Creates an empty filter; the first fix offered is always admitted.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_admitted: None,
        }
    }

    /// Offers a fix to the filter.
    ///
    /// Returns `Some(fix)` when the fix should be forwarded, `None` when it
    /// duplicates the previously admitted fix.
    pub fn admit(&mut self, fix: LocationFix) -> Option<LocationFix> {
        if let Some(last) = &self.last_admitted {
            if fix.is_duplicate_of(last) {
                return None;
            }
        }
        self.last_admitted = Some(fix);
        Some(fix)
    }

    /// Returns the most recently admitted fix, if any.
    #[must_use]
    pub const fn last_admitted(&self) -> Option<&LocationFix> {
        self.last_admitted.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(lat: f64, lon: f64, acc: f64) -> LocationFix {
        LocationFix::new(lat, lon, acc, 1_700_000_000_000)
    }

    #[test]
    fn test_first_fix_is_always_admitted() {
        let mut filter = DuplicateFilter::new();
        assert!(filter.admit(fix(1.0, 1.0, 5.0)).is_some());
    }

    #[test]
    fn test_consecutive_duplicate_is_suppressed() {
        let mut filter = DuplicateFilter::new();
        assert!(filter.admit(fix(1.0, 1.0, 5.0)).is_some());
        assert!(filter.admit(fix(1.0, 1.0, 5.0)).is_none());
    }

    #[test]
    fn test_accuracy_change_is_admitted() {
        let mut filter = DuplicateFilter::new();
        assert!(filter.admit(fix(1.0, 1.0, 5.0)).is_some());
        assert!(filter.admit(fix(1.0, 1.0, 5.0)).is_none());
        assert!(filter.admit(fix(1.0, 1.0, 6.0)).is_some());
    }

    #[test]
    fn test_timestamp_change_alone_is_still_duplicate() {
        let mut filter = DuplicateFilter::new();
        assert!(filter
            .admit(LocationFix::new(1.0, 2.0, 5.0, 1_000))
            .is_some());
        assert!(filter
            .admit(LocationFix::new(1.0, 2.0, 5.0, 2_000))
            .is_none());
    }

    #[test]
    fn test_non_consecutive_repeat_is_admitted() {
        let mut filter = DuplicateFilter::new();
        assert!(filter.admit(fix(1.0, 1.0, 5.0)).is_some());
        assert!(filter.admit(fix(2.0, 2.0, 5.0)).is_some());
        assert!(filter.admit(fix(1.0, 1.0, 5.0)).is_some());
    }

    #[test]
    fn test_negative_zero_differs_from_zero() {
        let mut filter = DuplicateFilter::new();
        assert!(filter.admit(fix(0.0, 0.0, 5.0)).is_some());
        assert!(filter.admit(fix(-0.0, 0.0, 5.0)).is_some());
    }

    #[test]
    fn test_nan_payload_compares_bitwise() {
        let mut filter = DuplicateFilter::new();
        assert!(filter.admit(fix(f64::NAN, 1.0, 5.0)).is_some());
        // Same NaN bit pattern: duplicate despite NaN != NaN.
        assert!(filter.admit(fix(f64::NAN, 1.0, 5.0)).is_none());
    }

    #[test]
    fn test_no_two_consecutive_admitted_are_duplicates() {
        // Admitted output never contains two consecutive duplicates,
        // whatever the input sequence.
        let inputs = [
            fix(1.0, 1.0, 5.0),
            fix(1.0, 1.0, 5.0),
            fix(1.0, 1.0, 6.0),
            fix(1.0, 1.0, 6.0),
            fix(1.0, 1.0, 6.0),
            fix(2.0, 1.0, 6.0),
            fix(1.0, 1.0, 6.0),
        ];
        let mut filter = DuplicateFilter::new();
        let admitted: Vec<_> = inputs.iter().filter_map(|f| filter.admit(*f)).collect();
        assert_eq!(admitted.len(), 4);
        for pair in admitted.windows(2) {
            assert!(!pair[0].is_duplicate_of(&pair[1]));
        }
    }

    #[test]
    fn test_fix_serde_round_trip() {
        let original = fix(12.5, -7.25, 3.5);
        let json = serde_json::to_string(&original).unwrap();
        let back: LocationFix = serde_json::from_str(&json).unwrap();
        assert_eq!(original, back);
    }
}
