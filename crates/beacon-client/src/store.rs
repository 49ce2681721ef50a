//! Durable single-slot pending event store.
//!
//! The [`PendingEventStore`] holds zero or one [`PendingEventRef`] in a
//! file that survives process restarts. Writes are last-writer-wins: a new
//! push overwrites any unconsumed predecessor, there is no queueing. Reads
//! are take-and-clear: once a resolver has taken the slot, every later
//! caller sees it empty.
//!
//! # Durability
//!
//! A `put` serializes the record to JSON, writes it to a temp file in the
//! slot directory, fsyncs, and renames over the slot path, so the slot is
//! always either the previous record or the new one, never a torn write.
//! An exclusive `fs2` file lock is acquired on first use and held for the
//! store's lifetime; a second process (stale instance, misconfigured test
//! runner) cannot interleave writes. In-process callers are serialized by
//! a mutex, which is what makes `take_if_present` atomic: two concurrent
//! callers can never both observe the same non-empty slot.

// Mutex poisoning indicates a panic in another thread, which is unrecoverable.
#![allow(clippy::missing_panics_doc)]

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use beacon_core::pending::PendingEventRef;
use fs2::FileExt;
use thiserror::Error;
use tracing::{debug, warn};

/// File name of the slot record inside the store directory.
pub const SLOT_FILE_NAME: &str = "pending_event.json";

/// File name of the temp file a `put` stages before the rename.
const SLOT_TMP_FILE_NAME: &str = "pending_event.json.tmp";

/// File name of the lock file guarding the store directory.
const LOCK_FILE_NAME: &str = "pending_event.lock";

/// Errors that can occur during pending slot operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The durable medium is unavailable. Callers must treat a failed `put`
    /// as "notification dropped".
    #[error("durable store unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    /// The slot record failed to serialize.
    #[error("slot record encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// The slot held an unparseable record. The slot is cleared before this
    /// is returned, so a poisoned record cannot wedge later attaches.
    #[error("corrupt slot record: {reason}")]
    Corrupt {
        /// Description of the parse failure.
        reason: String,
    },
}

/// Exclusive hold on the store directory, established lazily on first use.
struct SlotLock {
    /// Keeps the `fs2` exclusive lock alive for the store's lifetime.
    _lock_file: File,
}

/// Durable single-slot store for a pending event reference.
pub struct PendingEventStore {
    dir: PathBuf,
    /// `None` until the first operation opens the directory and takes the
    /// file lock; also serializes all slot access in-process.
    state: Mutex<Option<SlotLock>>,
}

impl PendingEventStore {
    /// Creates a store rooted at `dir`. No I/O happens until the first
    /// operation.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            state: Mutex::new(None),
        }
    }

    /// Stores `pending`, unconditionally overwriting any unconsumed
    /// previous record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the durable medium cannot
    /// be written. The failure is surfaced, never retried here.
    pub fn put(&self, pending: &PendingEventRef) -> Result<(), StoreError> {
        let mut state = self.state.lock().expect("lock poisoned");
        self.ensure_open(&mut state)?;

        let bytes = serde_json::to_vec(pending)?;
        let tmp_path = self.dir.join(SLOT_TMP_FILE_NAME);
        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(&bytes)?;
        tmp.sync_all()?;
        fs::rename(&tmp_path, self.slot_path())?;
        sync_dir(&self.dir)?;

        debug!(event_id = %pending.event_id, "pending event stored");
        Ok(())
    }

    /// Atomically takes the stored record, if any, clearing the slot.
    ///
    /// Two concurrent callers can never both observe the same non-empty
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on I/O failure, or
    /// [`StoreError::Corrupt`] when the slot held an unparseable record
    /// (the slot is cleared in that case).
    pub fn take_if_present(&self) -> Result<Option<PendingEventRef>, StoreError> {
        let mut state = self.state.lock().expect("lock poisoned");
        self.ensure_open(&mut state)?;

        let slot = self.slot_path();
        let bytes = match fs::read(&slot) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        // Clear before parsing so a corrupt record is consumed, not
        // re-encountered on every attach.
        fs::remove_file(&slot)?;
        sync_dir(&self.dir)?;

        match serde_json::from_slice::<PendingEventRef>(&bytes) {
            Ok(pending) => {
                debug!(event_id = %pending.event_id, "pending event taken");
                Ok(Some(pending))
            },
            Err(err) => {
                warn!(error = %err, "cleared corrupt pending slot record");
                Err(StoreError::Corrupt {
                    reason: err.to_string(),
                })
            },
        }
    }

    /// Clears the slot without reading it. Used on sign-out.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on I/O failure. Clearing an
    /// already-empty slot succeeds.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().expect("lock poisoned");
        self.ensure_open(&mut state)?;

        match fs::remove_file(self.slot_path()) {
            Ok(()) => {
                sync_dir(&self.dir)?;
                Ok(())
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn slot_path(&self) -> PathBuf {
        self.dir.join(SLOT_FILE_NAME)
    }

    /// Creates the directory and takes the exclusive lock on first use.
    fn ensure_open(&self, state: &mut Option<SlotLock>) -> Result<(), StoreError> {
        if state.is_some() {
            return Ok(());
        }
        fs::create_dir_all(&self.dir)?;
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(self.dir.join(LOCK_FILE_NAME))?;
        lock_file.try_lock_exclusive()?;
        *state = Some(SlotLock {
            _lock_file: lock_file,
        });
        Ok(())
    }
}

impl std::fmt::Debug for PendingEventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingEventStore")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

/// Fsyncs the directory entry after a rename or unlink.
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    // Directory fsync is a Unix notion; other platforms flush on rename.
    #[cfg(unix)]
    {
        File::open(dir)?.sync_all()?;
    }
    #[cfg(not(unix))]
    {
        let _ = dir;
    }
    Ok(())
}
