//! Discord HTTP API client implementing [`Gateway`].

use async_trait::async_trait;
use hush_types::{ChannelId, GuildId, UserId};
use serde::Deserialize;
use std::time::Duration;

use crate::event::WireUser;
use crate::{Gateway, GatewayError, GuildSummary};

/// Default API root (v10).
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Administrator bit in a role's permission set.
const PERMISSION_ADMINISTRATOR: u64 = 1 << 3;

/// Client for the Discord HTTP API, authenticated as a bot.
pub struct DiscordRest {
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
    api_base: String,
    authorization: String,
}

#[derive(Debug, Deserialize)]
struct MemberResponse {
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RoleResponse {
    id: String,
    #[serde(default)]
    name: String,
    /// Permission bitset, serialized by the API as a decimal string.
    permissions: String,
}

#[derive(Debug, Deserialize)]
struct PartialGuildResponse {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct GuildResponse {
    #[serde(default)]
    approximate_member_count: Option<u64>,
}

impl DiscordRest {
    /// Create a client with default timeouts against the public API.
    pub fn new(token: &str) -> Self {
        Self::with_base(token, DEFAULT_API_BASE)
    }

    /// Create a client against a custom API root (proxies, tests).
    pub fn with_base(token: &str, api_base: &str) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .user_agent(concat!("hush (https://github.com/hush-bot/hush, ", env!("CARGO_PKG_VERSION"), ")"))
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            api_base: api_base.trim_end_matches('/').to_string(),
            authorization: format!("Bot {token}"),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, GatewayError> {
        let response = self
            .http_client
            .get(self.url(path))
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Names of `bot`'s roles in `guild`.
    async fn bot_roles(&self, guild: &str, bot: &str) -> Result<Vec<String>, GatewayError> {
        let member: MemberResponse = self
            .get_json(&format!("/guilds/{guild}/members/{bot}"))
            .await?;
        let roles: Vec<RoleResponse> = self.get_json(&format!("/guilds/{guild}/roles")).await?;
        Ok(role_names(&member.roles, &roles))
    }
}

#[async_trait]
impl Gateway for DiscordRest {
    async fn send_notice(&self, channel: &ChannelId, text: &str) -> Result<(), GatewayError> {
        let response = self
            .http_client
            .post(self.url(&format!("/channels/{channel}/messages")))
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .json(&serde_json::json!({ "content": text }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn set_voice_mute(
        &self,
        guild: &GuildId,
        user: &UserId,
        mute: bool,
    ) -> Result<(), GatewayError> {
        let response = self
            .http_client
            .patch(self.url(&format!("/guilds/{guild}/members/{user}")))
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .json(&serde_json::json!({ "mute": mute }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn lookup_display_name(&self, user: &UserId) -> Result<String, GatewayError> {
        let wire: WireUser = self.get_json(&format!("/users/{user}")).await?;
        Ok(wire.display_name().to_string())
    }

    async fn is_administrator(
        &self,
        guild: &GuildId,
        user: &UserId,
    ) -> Result<bool, GatewayError> {
        let member: MemberResponse = self
            .get_json(&format!("/guilds/{guild}/members/{user}"))
            .await?;
        let roles: Vec<RoleResponse> = self.get_json(&format!("/guilds/{guild}/roles")).await?;
        has_administrator_role(&member.roles, &roles)
    }

    async fn list_guilds(&self) -> Result<Vec<GuildSummary>, GatewayError> {
        let me: WireUser = self.get_json("/users/@me").await?;
        let guilds: Vec<PartialGuildResponse> = self.get_json("/users/@me/guilds").await?;

        let mut summaries = Vec::with_capacity(guilds.len());
        for guild in guilds {
            let member_count = match self
                .get_json::<GuildResponse>(&format!("/guilds/{}?with_counts=true", guild.id))
                .await
            {
                Ok(details) => details.approximate_member_count,
                Err(e) => {
                    tracing::debug!(guild = %guild.id, error = %e, "guild details lookup failed");
                    None
                }
            };
            let bot_roles = match self.bot_roles(&guild.id, me.id()).await {
                Ok(roles) => Some(roles),
                Err(e) => {
                    tracing::debug!(guild = %guild.id, error = %e, "bot role lookup failed");
                    None
                }
            };
            summaries.push(GuildSummary {
                id: GuildId::new(guild.id),
                name: guild.name,
                member_count,
                bot_roles,
            });
        }
        Ok(summaries)
    }
}

/// Role names for `member_roles`, in the member's order. A role missing
/// from the guild list shows as `Role <id>`.
fn role_names(member_roles: &[String], guild_roles: &[RoleResponse]) -> Vec<String> {
    member_roles
        .iter()
        .map(|id| {
            guild_roles
                .iter()
                .find(|r| &r.id == id)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| format!("Role {id}"))
        })
        .collect()
}

fn has_administrator_role(
    member_roles: &[String],
    guild_roles: &[RoleResponse],
) -> Result<bool, GatewayError> {
    for role in guild_roles.iter().filter(|r| member_roles.contains(&r.id)) {
        let bits: u64 = role.permissions.parse().map_err(|_| {
            GatewayError::InvalidResponse(format!(
                "role {} has non-numeric permissions {:?}",
                role.id, role.permissions
            ))
        })?;
        if bits & PERMISSION_ADMINISTRATOR == PERMISSION_ADMINISTRATOR {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: &str, permissions: &str) -> RoleResponse {
        RoleResponse {
            id: id.into(),
            name: format!("role-{id}"),
            permissions: permissions.into(),
        }
    }

    #[test]
    fn client_creation_normalizes_base() {
        let client = DiscordRest::with_base("t", "http://localhost:9000/api/");
        assert_eq!(client.url("/users/1"), "http://localhost:9000/api/users/1");
        assert_eq!(client.authorization, "Bot t");
    }

    #[test]
    fn administrator_bit_detected_on_held_role() {
        let roles = vec![role("1", "0"), role("2", "8"), role("3", "2147483656")];
        assert!(has_administrator_role(&["2".into()], &roles).unwrap());
        assert!(has_administrator_role(&["3".into()], &roles).unwrap());
    }

    #[test]
    fn roles_not_held_do_not_count() {
        let roles = vec![role("1", "0"), role("2", "8")];
        assert!(!has_administrator_role(&["1".into()], &roles).unwrap());
        assert!(!has_administrator_role(&[], &roles).unwrap());
    }

    #[test]
    fn garbage_permissions_are_invalid_response() {
        let roles = vec![role("1", "lots")];
        let err = has_administrator_role(&["1".into()], &roles).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[test]
    fn role_names_follow_member_order() {
        let roles = vec![role("1", "0"), role("2", "8")];
        let names = role_names(&["2".into(), "9".into(), "1".into()], &roles);
        assert_eq!(names, vec!["role-2", "Role 9", "role-1"]);
    }

    #[test]
    fn guild_details_tolerate_missing_count() {
        let guild: GuildResponse = serde_json::from_str(r#"{"id": "1", "name": "g"}"#).unwrap();
        assert_eq!(guild.approximate_member_count, None);
        let guild: GuildResponse =
            serde_json::from_str(r#"{"approximate_member_count": 42}"#).unwrap();
        assert_eq!(guild.approximate_member_count, Some(42));
    }

    #[test]
    fn member_response_tolerates_missing_roles() {
        let member: MemberResponse = serde_json::from_str(r#"{"nick": null}"#).unwrap();
        assert!(member.roles.is_empty());
    }
}
