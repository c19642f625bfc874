//! In-memory record store.

use hush_types::{UserId, VoteRecord};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{RecordStore, Records};

/// Thread-safe in-memory [`RecordStore`] backed by an ordered map.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<Records>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Records) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    // A panic while holding the lock cannot leave a record half-written:
    // every mutation is a single map operation.
    fn lock(&self) -> MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, target: &UserId) -> Option<VoteRecord> {
        self.lock().get(target).cloned()
    }

    fn put(&self, target: &UserId, record: VoteRecord) {
        self.lock().insert(target.clone(), record);
    }

    fn delete(&self, target: &UserId) -> Option<VoteRecord> {
        self.lock().remove(target)
    }

    fn for_each(&self, f: &mut dyn FnMut(&UserId, &VoteRecord)) {
        for (target, record) in self.lock().iter() {
            f(target, record);
        }
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn export(&self) -> Records {
        self.lock().clone()
    }

    fn replace_all(&self, records: Records) {
        *self.lock() = records;
    }
}
