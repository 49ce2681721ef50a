//! Deep-link resolution on process attach.
//!
//! The [`DeepLinkResolver`] runs at every process attach point: cold start,
//! alert tap, foreground resume. It drains the pending slot at most once
//! and, when a reference is present, forwards the event id to the
//! navigation sink. Because the take clears the slot, a second invocation
//! in the same session (rotation, activity recreate) never re-navigates to
//! a stale event.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::provider::NavigationSink;
use crate::store::{PendingEventStore, StoreError};

/// The navigation decision produced by one attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget {
    /// Identifier of the event to show.
    pub event_id: String,
}

/// Drains the pending slot once per stored reference and drives navigation.
pub struct DeepLinkResolver {
    store: Arc<PendingEventStore>,
    navigation: Arc<dyn NavigationSink>,
    resolved_once: AtomicBool,
}

impl DeepLinkResolver {
    /// Creates a resolver over `store`, forwarding to `navigation`.
    #[must_use]
    pub fn new(store: Arc<PendingEventStore>, navigation: Arc<dyn NavigationSink>) -> Self {
        Self {
            store,
            navigation,
            resolved_once: AtomicBool::new(false),
        }
    }

    /// Decides the navigation target for one process attach.
    ///
    /// Takes the pending slot; when a reference was stored, the navigation
    /// sink receives its event id and the target is returned. An empty slot
    /// yields no navigation action.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from the slot read. A corrupt record has
    /// already been cleared by the store when this returns
    /// [`StoreError::Corrupt`].
    pub fn resolve_attach(&self) -> Result<Option<NavigationTarget>, StoreError> {
        match self.store.take_if_present()? {
            Some(pending) => {
                self.resolved_once.store(true, Ordering::Relaxed);
                info!(event_id = %pending.event_id, "resolving pending event navigation");
                self.navigation.navigate_to_event(&pending.event_id);
                Ok(Some(NavigationTarget {
                    event_id: pending.event_id,
                }))
            },
            None => {
                debug!("no pending event on attach");
                Ok(None)
            },
        }
    }

    /// Returns `true` once a reference has been resolved this session.
    /// Observability only; the drained slot is what prevents repeats.
    #[must_use]
    pub fn has_resolved(&self) -> bool {
        self.resolved_once.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for DeepLinkResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLinkResolver")
            .field("has_resolved", &self.has_resolved())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use beacon_core::pending::PendingEventRef;

    use super::*;

    #[derive(Default)]
    struct RecordingNavigationSink {
        targets: StdMutex<Vec<String>>,
    }

    impl NavigationSink for RecordingNavigationSink {
        fn navigate_to_event(&self, event_id: &str) {
            self.targets
                .lock()
                .expect("lock poisoned")
                .push(event_id.to_owned());
        }
    }

    fn pending(event_id: &str) -> PendingEventRef {
        PendingEventRef {
            event_id: event_id.to_owned(),
            title: String::new(),
            description: String::new(),
            received_at_epoch_ms: 0,
        }
    }

    #[test]
    fn test_resolves_stored_reference_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(PendingEventStore::new(dir.path()));
        let nav = Arc::new(RecordingNavigationSink::default());
        let resolver =
            DeepLinkResolver::new(Arc::clone(&store), Arc::clone(&nav) as Arc<dyn NavigationSink>);

        store.put(&pending("e42")).unwrap();

        let target = resolver.resolve_attach().unwrap().unwrap();
        assert_eq!(target.event_id, "e42");
        assert!(resolver.has_resolved());

        // Rotation / activity recreate: the second attach must not
        // re-navigate.
        assert!(resolver.resolve_attach().unwrap().is_none());
        assert_eq!(nav.targets.lock().expect("lock poisoned").len(), 1);
    }

    #[test]
    fn test_empty_slot_yields_no_navigation() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(PendingEventStore::new(dir.path()));
        let nav = Arc::new(RecordingNavigationSink::default());
        let resolver =
            DeepLinkResolver::new(store, Arc::clone(&nav) as Arc<dyn NavigationSink>);

        assert!(resolver.resolve_attach().unwrap().is_none());
        assert!(!resolver.has_resolved());
        assert!(nav.targets.lock().expect("lock poisoned").is_empty());
    }
}
