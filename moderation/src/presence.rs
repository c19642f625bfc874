//! Reconciles recorded mute state with a member's voice presence.

use hush_types::{Timestamp, VoteRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresenceDecision {
    Ignore,
    /// Joined voice while the mute is still running: apply it again.
    Reassert,
    /// Flag still set but the expiry has passed: reverse the mute now.
    Expire,
}

/// Decides what a voice-state change means for `record`.
///
/// A lapsed mute is reversed on any presence change, joining or leaving.
/// A running mute is only re-applied when the member is in voice.
pub fn decide(record: Option<&VoteRecord>, in_voice: bool, now: Timestamp) -> PresenceDecision {
    let Some(record) = record.filter(|r| r.is_muted) else {
        return PresenceDecision::Ignore;
    };
    if !record.mute_active(now) {
        PresenceDecision::Expire
    } else if in_voice {
        PresenceDecision::Reassert
    } else {
        PresenceDecision::Ignore
    }
}
