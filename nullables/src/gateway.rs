//! Nullable gateway: record platform calls without making them.

use async_trait::async_trait;
use hush_gateway::{Gateway, GatewayError, GuildSummary};
use hush_types::{ChannelId, GuildId, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::lock;

/// One call made against a [`NullGateway`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayCall {
    Notice {
        channel: ChannelId,
        text: String,
    },
    VoiceMute {
        guild: GuildId,
        user: UserId,
        mute: bool,
    },
}

/// A test gateway that records every call.
///
/// Mute and notice calls can be made to fail on demand. Display names and
/// administrators are configured up front; unknown users fail the name
/// lookup the way a missing platform user would.
#[derive(Debug, Default)]
pub struct NullGateway {
    calls: Mutex<Vec<GatewayCall>>,
    names: Mutex<HashMap<UserId, String>>,
    admins: Mutex<HashSet<(GuildId, UserId)>>,
    guilds: Mutex<Vec<GuildSummary>>,
    fail_mutes: AtomicBool,
    fail_notices: AtomicBool,
}

impl NullGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_display_name(&self, user: &UserId, name: &str) {
        lock(&self.names).insert(user.clone(), name.to_string());
    }

    pub fn grant_admin(&self, guild: &GuildId, user: &UserId) {
        lock(&self.admins).insert((guild.clone(), user.clone()));
    }

    /// Add a guild to the list returned by `list_guilds`.
    pub fn join_guild(&self, guild: GuildSummary) {
        lock(&self.guilds).push(guild);
    }

    /// Make subsequent voice-mute calls fail (they are still recorded).
    pub fn fail_mutes(&self, fail: bool) {
        self.fail_mutes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_notices(&self, fail: bool) {
        self.fail_notices.store(fail, Ordering::SeqCst);
    }

    /// All calls, in order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        lock(&self.calls).clone()
    }

    /// Text of every notice posted, in order.
    pub fn notices(&self) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                GatewayCall::Notice { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// `(user, mute)` for every voice-mute call, in order.
    pub fn mute_calls(&self) -> Vec<(UserId, bool)> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                GatewayCall::VoiceMute { user, mute, .. } => Some((user.clone(), *mute)),
                _ => None,
            })
            .collect()
    }

    pub fn reset(&self) {
        lock(&self.calls).clear();
    }
}

#[async_trait]
impl Gateway for NullGateway {
    async fn send_notice(&self, channel: &ChannelId, text: &str) -> Result<(), GatewayError> {
        lock(&self.calls).push(GatewayCall::Notice {
            channel: channel.clone(),
            text: text.to_string(),
        });
        if self.fail_notices.load(Ordering::SeqCst) {
            return Err(GatewayError::Unreachable("null gateway offline".into()));
        }
        Ok(())
    }

    async fn set_voice_mute(
        &self,
        guild: &GuildId,
        user: &UserId,
        mute: bool,
    ) -> Result<(), GatewayError> {
        lock(&self.calls).push(GatewayCall::VoiceMute {
            guild: guild.clone(),
            user: user.clone(),
            mute,
        });
        if self.fail_mutes.load(Ordering::SeqCst) {
            return Err(GatewayError::Status {
                status: 403,
                body: "Missing Permissions".into(),
            });
        }
        Ok(())
    }

    async fn lookup_display_name(&self, user: &UserId) -> Result<String, GatewayError> {
        lock(&self.names)
            .get(user)
            .cloned()
            .ok_or_else(|| GatewayError::Status {
                status: 404,
                body: "Unknown User".into(),
            })
    }

    async fn is_administrator(
        &self,
        guild: &GuildId,
        user: &UserId,
    ) -> Result<bool, GatewayError> {
        Ok(lock(&self.admins).contains(&(guild.clone(), user.clone())))
    }

    async fn list_guilds(&self) -> Result<Vec<GuildSummary>, GatewayError> {
        Ok(lock(&self.guilds).clone())
    }
}
