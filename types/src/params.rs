//! Moderation parameters: vote threshold and the two lifetimes.

use serde::{Deserialize, Serialize};

use crate::HushError;

/// Default number of live votes that triggers a mute.
pub const DEFAULT_VOTES_NEEDED: usize = 5;

/// Default lifetime of a single vote: 10 minutes.
pub const DEFAULT_VOTE_TTL_SECS: u64 = 10 * 60;

/// Default duration of a threshold-triggered mute: 5 minutes.
pub const DEFAULT_MUTE_TTL_SECS: u64 = 5 * 60;

/// Tunables for the vote-to-mute mechanism.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationParams {
    /// Minimum count of live votes required to trigger a mute.
    pub votes_needed: usize,

    /// Lifetime of a single vote before it stops counting.
    pub vote_ttl_secs: u64,

    /// Duration of an active mute.
    pub mute_ttl_secs: u64,
}

impl ModerationParams {
    /// Reject parameter sets that would make the mechanism degenerate.
    pub fn validate(&self) -> Result<(), HushError> {
        if self.votes_needed == 0 {
            return Err(HushError::InvalidParams(
                "votes_needed must be at least 1".into(),
            ));
        }
        if self.vote_ttl_secs == 0 {
            return Err(HushError::InvalidParams(
                "vote_ttl_secs must be non-zero".into(),
            ));
        }
        if self.mute_ttl_secs == 0 {
            return Err(HushError::InvalidParams(
                "mute_ttl_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ModerationParams {
    fn default() -> Self {
        Self {
            votes_needed: DEFAULT_VOTES_NEEDED,
            vote_ttl_secs: DEFAULT_VOTE_TTL_SECS,
            mute_ttl_secs: DEFAULT_MUTE_TTL_SECS,
        }
    }
}
