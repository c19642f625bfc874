//! Crowd moderation: members vote to temporarily silence another member.
//!
//! Votes against a target accumulate with independent per-voter expiries.
//! When the live vote count reaches the threshold the target is muted
//! through the gateway for a fixed duration; a one-shot timer, a presence
//! check or an administrator reverses it.
//!
//! ## Module overview
//!
//! - [`aggregator`]: eligibility, expiry sweep, duplicate detection, threshold.
//! - [`mute`]: the `Unmuted -> Muted -> Unmuted` transitions.
//! - [`presence`]: what a voice-presence change means for a record.
//! - [`moderator`]: the serialized entry points tying the above to the
//!   store, the snapshot backend, the gateway and the timer.
//! - [`clock`] / [`scheduler`]: time and timer seams.
//! - [`outcome`]: structured results reported to callers.

pub mod aggregator;
pub mod clock;
pub mod error;
pub mod moderator;
pub mod mute;
pub mod outcome;
pub mod presence;
pub mod scheduler;

pub use aggregator::{Ballot, VoteTally};
pub use clock::{Clock, SystemClock};
pub use error::ModerationError;
pub use moderator::{Moderator, RestoreReport};
pub use mute::MuteState;
pub use outcome::{ClearOutcome, ExpiryOutcome, PresenceOutcome, Rejection, VoteOutcome};
pub use presence::PresenceDecision;
pub use scheduler::UnmuteScheduler;
