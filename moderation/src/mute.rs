//! The per-target mute state machine.
//!
//! ```text
//!            threshold met, platform mute ok
//!   Unmuted ─────────────────────────────────▶ Muted(expiry, epoch)
//!      ▲                                           │
//!      └──── timer (same epoch) / lapsed on join ──┤
//!      └──── administrative clear ─────────────────┘
//! ```
//!
//! Entering `Muted` requires the platform call to succeed. Leaving it always
//! clears local state, even when the platform call fails.

use hush_gateway::{Gateway, GatewayError};
use hush_types::{GuildId, Timestamp, UserId, VoteRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MuteState {
    Unmuted,
    Muted { expiry: Timestamp, epoch: u64 },
}

impl MuteState {
    pub fn of(record: &VoteRecord) -> Self {
        if record.is_muted {
            MuteState::Muted {
                expiry: record.mute_expiry,
                epoch: record.mute_epoch,
            }
        } else {
            MuteState::Unmuted
        }
    }
}

/// `Unmuted -> Muted`. Mutes `target` in `guild` and, only on success,
/// stamps the record with the new expiry and `epoch`.
///
/// `epoch` must never have been issued before, including to a record that
/// has since been cleared, or a leftover timer could end the new mute.
pub async fn enter_muted(
    gateway: &dyn Gateway,
    guild: &GuildId,
    target: &UserId,
    record: &mut VoteRecord,
    now: Timestamp,
    mute_ttl_secs: u64,
    epoch: u64,
) -> Result<(), GatewayError> {
    gateway.set_voice_mute(guild, target, true).await?;

    record.is_muted = true;
    record.mute_expiry = now.plus_secs(mute_ttl_secs);
    record.mute_guild = Some(guild.clone());
    record.mute_epoch = epoch;
    Ok(())
}

/// `Muted -> Unmuted`. No-op on an unmuted record.
///
/// The platform unmute goes to the guild the mute was applied in, or to
/// `fallback_guild` for records that predate guild tracking. Local state is
/// cleared regardless of the platform result, which is returned for logging.
pub async fn leave_muted(
    gateway: &dyn Gateway,
    fallback_guild: Option<&GuildId>,
    target: &UserId,
    record: &mut VoteRecord,
) -> Result<(), GatewayError> {
    if !record.is_muted {
        return Ok(());
    }

    let result = match record.mute_guild.as_ref().or(fallback_guild) {
        Some(guild) => gateway.set_voice_mute(guild, target, false).await,
        None => Err(GatewayError::Other(format!(
            "no guild known for muted user {target}"
        ))),
    };

    record.is_muted = false;
    record.mute_guild = None;
    result
}
