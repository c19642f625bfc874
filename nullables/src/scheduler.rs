//! Nullable scheduler: remember armed timers instead of sleeping.

use hush_moderation::UnmuteScheduler;
use hush_types::UserId;
use std::sync::Mutex;
use std::time::Duration;

use crate::lock;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledUnmute {
    pub target: UserId,
    pub epoch: u64,
    pub after: Duration,
}

/// Records every armed timer. Tests fire them by calling
/// `Moderator::expire_mute` themselves.
#[derive(Debug, Default)]
pub struct NullScheduler {
    scheduled: Mutex<Vec<ScheduledUnmute>>,
}

impl NullScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled(&self) -> Vec<ScheduledUnmute> {
        lock(&self.scheduled).clone()
    }

    /// Drain the armed timers.
    pub fn take(&self) -> Vec<ScheduledUnmute> {
        std::mem::take(&mut *lock(&self.scheduled))
    }
}

impl UnmuteScheduler for NullScheduler {
    fn schedule_unmute(&self, target: &UserId, epoch: u64, after: Duration) {
        lock(&self.scheduled).push(ScheduledUnmute {
            target: target.clone(),
            epoch,
            after,
        });
    }
}
