//! Unmute timer seam.

use hush_types::UserId;
use std::time::Duration;

/// Arms one-shot unmute timers.
///
/// When a timer fires, the implementation must route it back through
/// [`Moderator::expire_mute`](crate::Moderator::expire_mute) with the same
/// `target` and `epoch`, so the muted-and-same-epoch guard decides whether it
/// still applies. There is no cancellation: a stale timer is simply a no-op.
pub trait UnmuteScheduler: Send + Sync {
    fn schedule_unmute(&self, target: &UserId, epoch: u64, after: Duration);
}
