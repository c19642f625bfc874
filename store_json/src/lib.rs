//! JSON snapshot-file backend for hush.
//!
//! Implements [`hush_store::SnapshotStore`] over a single pretty-printed JSON
//! document. Writes go to a sibling temporary file which is then renamed over
//! the snapshot, so a crash mid-write never leaves a torn document behind.

pub mod error;
pub mod file;

pub use error::JsonStoreError;
pub use file::{JsonSnapshotFile, SnapshotDocument};
