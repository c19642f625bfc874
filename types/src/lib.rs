//! Fundamental types for the hush voice-moderation bot.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! platform identities, timestamps, the per-target vote record and the
//! moderation parameters.

pub mod error;
pub mod id;
pub mod params;
pub mod record;
pub mod time;

pub use error::HushError;
pub use id::{ChannelId, GuildId, UserId};
pub use params::ModerationParams;
pub use record::VoteRecord;
pub use time::Timestamp;
