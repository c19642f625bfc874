//! The outbound interface the moderation core depends on.

use async_trait::async_trait;
use hush_types::{ChannelId, GuildId, UserId};

use crate::GatewayError;

/// A guild the bot belongs to.
///
/// Details are best-effort: a field is `None` when its lookup failed, so
/// one unreachable guild does not hide the others.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuildSummary {
    pub id: GuildId,
    pub name: String,
    pub member_count: Option<u64>,
    /// Names of the roles the bot holds in this guild.
    pub bot_roles: Option<Vec<String>>,
}

/// Imperative actions against the chat platform.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Post a user-facing notice. Callers log failures and never retry.
    async fn send_notice(&self, channel: &ChannelId, text: &str) -> Result<(), GatewayError>;

    /// Set or clear the server-side voice mute flag for `user` in `guild`.
    async fn set_voice_mute(
        &self,
        guild: &GuildId,
        user: &UserId,
        mute: bool,
    ) -> Result<(), GatewayError>;

    /// Resolve the name shown for `user`.
    async fn lookup_display_name(&self, user: &UserId) -> Result<String, GatewayError>;

    /// Whether `user` holds administrator rights in `guild`.
    async fn is_administrator(&self, guild: &GuildId, user: &UserId)
        -> Result<bool, GatewayError>;

    /// Guilds the bot is a member of, in the order the platform lists them.
    async fn list_guilds(&self) -> Result<Vec<GuildSummary>, GatewayError>;
}

/// Best-effort name lookup: falls back to `User <id>` when the platform
/// cannot resolve the identity.
pub async fn display_name_or_placeholder<G: Gateway + ?Sized>(gateway: &G, user: &UserId) -> String {
    match gateway.lookup_display_name(user).await {
        Ok(name) => name,
        Err(e) => {
            tracing::debug!(user = %user, error = %e, "display name lookup failed");
            format!("User {user}")
        }
    }
}
