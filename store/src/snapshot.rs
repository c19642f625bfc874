//! Snapshot persistence trait.

use crate::{Records, StoreError};

/// Durable storage for whole-store snapshots.
///
/// Every save overwrites the previous snapshot. There is no incremental
/// log: a crash between a mutation and its save loses that mutation.
pub trait SnapshotStore: Send + Sync {
    /// Persist `records`, replacing any previous snapshot.
    fn save(&self, records: &Records) -> Result<(), StoreError>;

    /// Load the last snapshot. `Ok(None)` means no snapshot exists yet.
    fn load(&self) -> Result<Option<Records>, StoreError>;
}
