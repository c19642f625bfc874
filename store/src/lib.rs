//! Storage contracts for hush.
//!
//! The in-memory [`RecordStore`] is the single source of truth for vote and
//! mute state; a [`SnapshotStore`] backend persists it wholesale. The rest of
//! the codebase depends only on these traits.

pub mod error;
pub mod memory;
pub mod record;
pub mod snapshot;

pub use error::StoreError;
pub use memory::MemoryRecordStore;
pub use record::{RecordStore, Records};
pub use snapshot::SnapshotStore;
