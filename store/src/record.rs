//! Vote-record store trait.

use hush_types::{UserId, VoteRecord};
use std::collections::BTreeMap;

/// The full store contents, ordered by target identity.
pub type Records = BTreeMap<UserId, VoteRecord>;

/// Holder of every target's [`VoteRecord`].
///
/// Implementations only hold data; policy (expiry, thresholds, mute
/// transitions) lives in the moderation crate. Every method must be safe to
/// call from concurrent callers, but read-modify-write sequences spanning
/// several calls need an outer critical section.
pub trait RecordStore: Send + Sync {
    /// Fetch a copy of the record for `target`.
    fn get(&self, target: &UserId) -> Option<VoteRecord>;

    /// Insert or overwrite the record for `target`.
    fn put(&self, target: &UserId, record: VoteRecord);

    /// Remove the record for `target`, returning it if present.
    fn delete(&self, target: &UserId) -> Option<VoteRecord>;

    /// Visit every record in target order.
    fn for_each(&self, f: &mut dyn FnMut(&UserId, &VoteRecord));

    /// Number of targets with a record.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the whole store, for snapshotting.
    fn export(&self) -> Records;

    /// Replace the whole store, used once at startup when restoring.
    fn replace_all(&self, records: Records);
}
