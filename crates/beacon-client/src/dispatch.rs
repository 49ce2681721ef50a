//! Inbound push handling.
//!
//! The [`NotificationDispatcher`] translates a raw push payload into a
//! stored [`PendingEventRef`] and a locally displayed alert. The alert's
//! tap intent carries the same event id as the stored reference, so an
//! alert tap and a silent cold-start both converge on the deep-link
//! resolver.
//!
//! Display and storage are **not** transactional: the alert is posted even
//! when the slot write fails, and the storage error is surfaced to the
//! caller, who must treat it as "notification dropped". Platform push is
//! already best-effort, so the user sees no failure surface.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use beacon_core::pending::PendingEventRef;
use thiserror::Error;
use tracing::{debug, warn};

use crate::provider::{AlertSink, EventAlert};
use crate::store::{PendingEventStore, StoreError};

/// Errors that can occur while dispatching an inbound push.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DispatchError {
    /// The pending slot write failed. The alert may still have been
    /// displayed; the pending reference is lost.
    #[error("pending slot write failed: {0}")]
    Storage(#[from] StoreError),
}

/// Outcome of handling one inbound push payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The payload was stored and an alert was posted.
    Delivered,

    /// The payload carried no usable event id and was ignored. Foreign and
    /// malformed pushes are expected traffic, not errors.
    Ignored,
}

/// Translates inbound push payloads into stored references and alerts.
pub struct NotificationDispatcher {
    store: Arc<PendingEventStore>,
    alerts: Arc<dyn AlertSink>,
    alert_channel: String,
}

impl NotificationDispatcher {
    /// Creates a dispatcher posting alerts on `alert_channel`.
    #[must_use]
    pub fn new(
        store: Arc<PendingEventStore>,
        alerts: Arc<dyn AlertSink>,
        alert_channel: impl Into<String>,
    ) -> Self {
        Self {
            store,
            alerts,
            alert_channel: alert_channel.into(),
        }
    }

    /// Handles one inbound push payload.
    ///
    /// A valid payload produces exactly one slot write and at most one
    /// posted alert. Platform redelivery of the same push is idempotent:
    /// the overwrite stores identical content and the alert is re-posted
    /// with the same intent.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Storage`] when the slot write fails. The
    /// alert is posted regardless; the caller must not assume a displayed
    /// alert implies a stored reference.
    pub fn on_push_received(
        &self,
        payload: &HashMap<String, String>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let received_at = now_epoch_ms();
        let Some(pending) = PendingEventRef::from_push_payload(payload, received_at) else {
            debug!("push payload without usable event id ignored");
            return Ok(DispatchOutcome::Ignored);
        };

        let stored = self.store.put(&pending);
        if let Err(err) = &stored {
            warn!(event_id = %pending.event_id, error = %err, "pending slot write failed, notification dropped");
        }

        self.alerts.post_alert(EventAlert {
            event_id: pending.event_id.clone(),
            title: pending.title.clone(),
            body: pending.description.clone(),
            channel: self.alert_channel.clone(),
        });

        stored?;
        Ok(DispatchOutcome::Delivered)
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("alert_channel", &self.alert_channel)
            .finish_non_exhaustive()
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
#[allow(clippy::cast_possible_truncation)]
fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use super::*;

    #[derive(Default)]
    struct RecordingAlertSink {
        alerts: StdMutex<Vec<EventAlert>>,
    }

    impl AlertSink for RecordingAlertSink {
        fn post_alert(&self, alert: EventAlert) {
            self.alerts.lock().expect("lock poisoned").push(alert);
        }
    }

    fn payload(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn dispatcher(dir: &std::path::Path) -> (NotificationDispatcher, Arc<RecordingAlertSink>) {
        let store = Arc::new(PendingEventStore::new(dir));
        let alerts = Arc::new(RecordingAlertSink::default());
        let dispatcher = NotificationDispatcher::new(
            store,
            Arc::clone(&alerts) as Arc<dyn AlertSink>,
            "events",
        );
        (dispatcher, alerts)
    }

    #[test]
    fn test_valid_push_stores_and_alerts() {
        let dir = tempfile::tempdir().unwrap();
        let (dispatcher, alerts) = dispatcher(dir.path());

        let outcome = dispatcher
            .on_push_received(&payload(&[("eventId", "e42"), ("title", "Flash Sale")]))
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Delivered);

        let posted = alerts.alerts.lock().expect("lock poisoned");
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].event_id, "e42");
        assert_eq!(posted[0].title, "Flash Sale");
        assert_eq!(posted[0].channel, "events");
    }

    #[test]
    fn test_payload_without_event_id_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let (dispatcher, alerts) = dispatcher(dir.path());

        let outcome = dispatcher
            .on_push_received(&payload(&[("title", "Flash Sale")]))
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Ignored);
        assert!(alerts.alerts.lock().expect("lock poisoned").is_empty());
    }

    #[test]
    fn test_redelivery_overwrites_with_same_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(PendingEventStore::new(dir.path()));
        let alerts = Arc::new(RecordingAlertSink::default());
        let dispatcher = NotificationDispatcher::new(
            Arc::clone(&store),
            Arc::clone(&alerts) as Arc<dyn AlertSink>,
            "events",
        );

        let p = payload(&[("eventId", "e42"), ("title", "Flash Sale")]);
        dispatcher.on_push_received(&p).unwrap();
        dispatcher.on_push_received(&p).unwrap();

        let taken = store.take_if_present().unwrap().unwrap();
        assert_eq!(taken.event_id, "e42");
        assert!(store.take_if_present().unwrap().is_none());
        assert_eq!(alerts.alerts.lock().expect("lock poisoned").len(), 2);
    }
}
