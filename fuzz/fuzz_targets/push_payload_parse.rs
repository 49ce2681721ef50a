//! Fuzz harness for `PendingEventRef::from_push_payload`.
//!
//! Push payloads arrive from an untrusted transport, so parsing must never
//! panic on malformed Unicode, overlong fields, or hostile key/value
//! combinations. The input bytes are split into newline-separated
//! `key=value` lines to build an arbitrary payload map.

#![no_main]

use std::collections::HashMap;

use beacon_core::pending::{PendingEventRef, MAX_DESCRIPTION_LEN, MAX_EVENT_ID_LEN, MAX_TITLE_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let mut payload = HashMap::new();
    for line in text.split('\n') {
        if let Some((key, value)) = line.split_once('=') {
            payload.insert(key.to_owned(), value.to_owned());
        }
    }

    if let Some(pending) = PendingEventRef::from_push_payload(&payload, 0) {
        // Parsed output always honors the field bounds.
        assert!(!pending.event_id.is_empty());
        assert!(pending.event_id.len() <= MAX_EVENT_ID_LEN);
        assert!(pending.title.len() <= MAX_TITLE_LEN);
        assert!(pending.description.len() <= MAX_DESCRIPTION_LEN);
    }
});
