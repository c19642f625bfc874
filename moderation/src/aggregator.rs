//! Vote aggregation over a single record.
//!
//! Everything here is a pure function of the record, the ballot and the
//! current time. The [`Moderator`](crate::Moderator) owns locking,
//! persistence and the side effects of crossing the threshold.

use hush_types::{GuildId, ModerationParams, Timestamp, UserId, VoteRecord};

use crate::outcome::Rejection;

/// One member's request to mute another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ballot {
    pub guild: GuildId,
    pub target: UserId,
    pub voter: UserId,
    /// Set when the platform reports the target as an automated account.
    pub target_is_exempt: bool,
}

impl Ballot {
    pub fn new(guild: GuildId, target: UserId, voter: UserId) -> Self {
        Self {
            guild,
            target,
            voter,
            target_is_exempt: false,
        }
    }

    pub fn exempt(mut self, exempt: bool) -> Self {
        self.target_is_exempt = exempt;
        self
    }

    /// Checks that need no record: self-votes and exempt targets.
    pub fn check_eligibility(&self) -> Result<(), Rejection> {
        if self.voter == self.target {
            return Err(Rejection::SelfVote);
        }
        if self.target_is_exempt {
            return Err(Rejection::ExemptTarget);
        }
        Ok(())
    }
}

/// Result of an accepted vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoteTally {
    /// Live votes after insertion.
    pub count: usize,
    /// When the vote just cast stops counting.
    pub vote_expires_at: Timestamp,
    /// `count` reached the threshold and the target is not flagged as muted.
    pub threshold_met: bool,
}

/// Removes every vote whose expiry is at or before `now`.
///
/// Returns the number of votes removed. An emptied record is left in place.
pub fn sweep_expired(record: &mut VoteRecord, now: Timestamp) -> usize {
    let before = record.votes.len();
    record.votes.retain(|_, expiry| !expiry.has_passed(now));
    before - record.votes.len()
}

/// Applies `voter`'s vote to `record`.
///
/// On rejection the caller should discard `record`: an already-muted target
/// is rejected before the sweep, a duplicate after it.
pub fn apply_vote(
    record: &mut VoteRecord,
    voter: &UserId,
    now: Timestamp,
    params: &ModerationParams,
) -> Result<VoteTally, Rejection> {
    if let Some(remaining_secs) = record.mute_remaining(now) {
        return Err(Rejection::AlreadyMuted { remaining_secs });
    }

    sweep_expired(record, now);

    if let Some(remaining_secs) = record.vote_remaining(voter, now) {
        return Err(Rejection::DuplicateVote { remaining_secs });
    }

    let vote_expires_at = now.plus_secs(params.vote_ttl_secs);
    record.votes.insert(voter.clone(), vote_expires_at);

    let count = record.vote_count();
    Ok(VoteTally {
        count,
        vote_expires_at,
        threshold_met: count >= params.votes_needed && !record.is_muted,
    })
}
