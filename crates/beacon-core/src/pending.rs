//! Pending event references and push payload parsing.
//!
//! A [`PendingEventRef`] is a stored pointer to an event the UI should
//! navigate to once the app is foregrounded. It is produced from an inbound
//! push payload and persisted by the client's single-slot store until a
//! resolver consumes it.
//!
//! Push payloads are string maps delivered by the platform transport.
//! Foreign or malformed payloads (no usable `eventId`) are expected traffic
//! and parse to `None` rather than an error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Payload key carrying the event identifier.
pub const EVENT_ID_KEY: &str = "eventId";

/// Payload key carrying the display title.
pub const TITLE_KEY: &str = "title";

/// Payload key carrying the display description.
pub const DESCRIPTION_KEY: &str = "description";

/// Maximum stored length of an event id, in bytes.
pub const MAX_EVENT_ID_LEN: usize = 128;

/// Maximum stored length of a title, in bytes.
pub const MAX_TITLE_LEN: usize = 256;

/// Maximum stored length of a description, in bytes.
pub const MAX_DESCRIPTION_LEN: usize = 1_024;

/// A stored pointer to an event awaiting navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PendingEventRef {
    /// Identifier of the event to navigate to.
    pub event_id: String,

    /// Display title from the push payload; may be empty.
    pub title: String,

    /// Display description from the push payload; may be empty.
    pub description: String,

    /// Receipt time in milliseconds since the Unix epoch.
    pub received_at_epoch_ms: i64,
}

impl PendingEventRef {
    /// Parses an inbound push payload into a pending reference.
    ///
    /// Returns `None` when the payload carries no usable `eventId` (absent,
    /// empty, or whitespace-only). Title and description are optional and
    /// default to empty. Over-long fields are truncated at a character
    /// boundary rather than rejected; a hostile payload must not be able to
    /// wedge push delivery.
    #[must_use]
    pub fn from_push_payload(
        payload: &HashMap<String, String>,
        received_at_epoch_ms: i64,
    ) -> Option<Self> {
        let event_id = payload.get(EVENT_ID_KEY).map(|v| v.trim())?;
        if event_id.is_empty() {
            return None;
        }
        let title = payload.get(TITLE_KEY).map(String::as_str).unwrap_or("");
        let description = payload
            .get(DESCRIPTION_KEY)
            .map(String::as_str)
            .unwrap_or("");
        Some(Self {
            event_id: truncate_utf8(event_id, MAX_EVENT_ID_LEN).to_owned(),
            title: truncate_utf8(title, MAX_TITLE_LEN).to_owned(),
            description: truncate_utf8(description, MAX_DESCRIPTION_LEN).to_owned(),
            received_at_epoch_ms,
        })
    }
}

/// Truncates `s` to at most `max_bytes`, backing up to a `char` boundary.
fn truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
