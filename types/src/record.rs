//! The per-target vote/mute record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{GuildId, Timestamp, UserId};

/// Everything hush knows about one vote target.
///
/// A record is created on the first vote against a target and lives until an
/// administrative clear deletes it; vote expiry alone never removes it.
/// Field names on disk follow the snapshot layout (`muted_by`,
/// `mute_expiry`, `is_globally_muted`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    /// Voter identity -> instant at which that voter's vote stops counting.
    #[serde(rename = "muted_by", default)]
    pub votes: BTreeMap<UserId, Timestamp>,

    /// End of the active mute. Meaningful only while `is_muted` is set.
    #[serde(default)]
    pub mute_expiry: Timestamp,

    /// Whether a threshold-triggered mute is in force.
    #[serde(rename = "is_globally_muted", default)]
    pub is_muted: bool,

    /// Guild in which the active mute was applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mute_guild: Option<GuildId>,

    /// Incremented on every transition into the muted state.
    #[serde(default)]
    pub mute_epoch: u64,
}

impl VoteRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the vote set (live only after a sweep).
    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    /// Whether the mute flag is set and its expiry is still ahead of `now`.
    pub fn mute_active(&self, now: Timestamp) -> bool {
        self.is_muted && !self.mute_expiry.has_passed(now)
    }

    /// Seconds left on the active mute, or `None` when not actively muted.
    pub fn mute_remaining(&self, now: Timestamp) -> Option<u64> {
        self.mute_active(now)
            .then(|| self.mute_expiry.secs_until(now))
    }

    /// Seconds left on `voter`'s vote, or `None` if they have no live vote.
    pub fn vote_remaining(&self, voter: &UserId, now: Timestamp) -> Option<u64> {
        self.votes
            .get(voter)
            .filter(|expiry| !expiry.has_passed(now))
            .map(|expiry| expiry.secs_until(now))
    }
}
