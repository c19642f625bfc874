//! Nullable snapshot store: in-memory snapshots with failure injection.

use hush_store::{Records, SnapshotStore, StoreError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::lock;

/// Keeps the last saved snapshot in memory.
#[derive(Debug, Default)]
pub struct NullSnapshotStore {
    saved: Mutex<Option<Records>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
    corrupt: AtomicBool,
}

impl NullSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose snapshot already holds `records`.
    pub fn with_records(records: Records) -> Self {
        Self {
            saved: Mutex::new(Some(records)),
            ..Self::default()
        }
    }

    /// A store whose snapshot exists but cannot be decoded.
    pub fn corrupted() -> Self {
        let store = Self::default();
        store.corrupt.store(true, Ordering::SeqCst);
        store
    }

    /// Make subsequent saves fail.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// The last successfully saved snapshot.
    pub fn saved(&self) -> Option<Records> {
        lock(&self.saved).clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl SnapshotStore for NullSnapshotStore {
    fn save(&self, records: &Records) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                path: "null".into(),
                message: "disk full".into(),
            });
        }
        *lock(&self.saved) = Some(records.clone());
        self.corrupt.store(false, Ordering::SeqCst);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load(&self) -> Result<Option<Records>, StoreError> {
        if self.corrupt.load(Ordering::SeqCst) {
            return Err(StoreError::Corruption("unexpected end of input".into()));
        }
        Ok(lock(&self.saved).clone())
    }
}
