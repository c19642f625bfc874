//! Structured results of moderation operations.

use hush_gateway::GatewayError;
use hush_types::{GuildId, Timestamp};

/// Why a vote was not recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    SelfVote,
    ExemptTarget,
    AlreadyMuted { remaining_secs: u64 },
    DuplicateVote { remaining_secs: u64 },
}

/// Result of [`Moderator::cast_vote`](crate::Moderator::cast_vote).
#[derive(Debug)]
pub enum VoteOutcome {
    /// Vote stored; threshold not reached.
    Recorded {
        count: usize,
        needed: usize,
        vote_expires_at: Timestamp,
    },
    /// Vote stored and the target is now muted.
    Muted {
        count: usize,
        needed: usize,
        mute_expires_at: Timestamp,
    },
    /// Vote stored, threshold reached, but the platform refused the mute.
    /// The record stays unmuted; the next vote retries.
    MuteFailed {
        count: usize,
        needed: usize,
        error: GatewayError,
    },
    Rejected(Rejection),
}

impl VoteOutcome {
    pub fn accepted(&self) -> bool {
        !matches!(self, VoteOutcome::Rejected(_))
    }

    /// Live vote count after the vote, when it was accepted.
    pub fn count(&self) -> Option<usize> {
        match self {
            VoteOutcome::Recorded { count, .. }
            | VoteOutcome::Muted { count, .. }
            | VoteOutcome::MuteFailed { count, .. } => Some(*count),
            VoteOutcome::Rejected(_) => None,
        }
    }

    pub fn muted(&self) -> bool {
        matches!(self, VoteOutcome::Muted { .. })
    }
}

/// Result of a voice-presence change.
#[derive(Debug)]
pub enum PresenceOutcome {
    /// Nothing to do for this member.
    Ignored,
    /// The member joined voice during an active mute; the mute was re-applied.
    Reasserted,
    /// As `Reasserted`, but the platform call failed. State is unchanged.
    ReassertFailed(GatewayError),
    /// The mute had lapsed and was reversed.
    Unmuted { error: Option<GatewayError> },
}

/// Result of a fired unmute timer.
#[derive(Debug)]
pub enum ExpiryOutcome {
    /// Record missing, not muted, or re-muted since the timer was armed.
    Stale,
    /// `guild` is where the mute had been applied, when known.
    Unmuted {
        guild: Option<GuildId>,
        error: Option<GatewayError>,
    },
}

/// Result of [`Moderator::clear`](crate::Moderator::clear).
#[derive(Debug)]
pub enum ClearOutcome {
    NoRecord,
    Cleared {
        was_muted: bool,
        unmute_error: Option<GatewayError>,
    },
}

impl ClearOutcome {
    pub fn had_record(&self) -> bool {
        matches!(self, ClearOutcome::Cleared { .. })
    }
}
