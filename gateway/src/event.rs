//! Inbound events and the Discord dispatch payloads they are decoded from.

use hush_types::{ChannelId, GuildId, UserId};
use serde::Deserialize;

/// A user as seen in message events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Author {
    pub id: UserId,
    pub username: String,
    /// System and bot accounts are exempt from votes.
    pub bot: bool,
}

/// A text message posted in a guild channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingMessage {
    pub guild: Option<GuildId>,
    pub channel: ChannelId,
    pub author: Author,
    pub content: String,
    /// Mentioned users in message order.
    pub mentions: Vec<Author>,
}

/// A change in a member's voice-channel presence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoiceStateChange {
    pub guild: GuildId,
    pub user: UserId,
    /// `None` when the member left voice.
    pub channel: Option<ChannelId>,
}

/// Everything the bot reacts to from the platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayEvent {
    /// Session established.
    Ready {
        user: UserId,
        username: String,
        guilds: usize,
    },
    MessageCreated(IncomingMessage),
    VoiceStateUpdated(VoiceStateChange),
}

// ── Discord wire payloads ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct WireUser {
    id: String,
    username: String,
    #[serde(default)]
    global_name: Option<String>,
    #[serde(default)]
    bot: bool,
}

impl WireUser {
    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

impl From<WireUser> for Author {
    fn from(u: WireUser) -> Self {
        Author {
            id: UserId::new(u.id),
            username: u.username,
            bot: u.bot,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    channel_id: String,
    #[serde(default)]
    guild_id: Option<String>,
    author: WireUser,
    #[serde(default)]
    content: String,
    #[serde(default)]
    mentions: Vec<WireUser>,
}

#[derive(Debug, Deserialize)]
struct WireVoiceState {
    #[serde(default)]
    guild_id: Option<String>,
    #[serde(default)]
    channel_id: Option<String>,
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct WireReady {
    user: WireUser,
    #[serde(default)]
    guilds: Vec<serde_json::Value>,
}

impl GatewayEvent {
    /// Decode a dispatch (`op 0`) by event name. Unhandled names and
    /// guild-less voice states yield `Ok(None)`.
    pub fn from_dispatch(
        name: &str,
        data: serde_json::Value,
    ) -> Result<Option<Self>, serde_json::Error> {
        let event = match name {
            "READY" => {
                let ready: WireReady = serde_json::from_value(data)?;
                Some(GatewayEvent::Ready {
                    user: UserId::new(ready.user.id),
                    username: ready.user.username,
                    guilds: ready.guilds.len(),
                })
            }
            "MESSAGE_CREATE" => {
                let msg: WireMessage = serde_json::from_value(data)?;
                Some(GatewayEvent::MessageCreated(IncomingMessage {
                    guild: msg.guild_id.map(GuildId::new),
                    channel: ChannelId::new(msg.channel_id),
                    author: msg.author.into(),
                    content: msg.content,
                    mentions: msg.mentions.into_iter().map(Author::from).collect(),
                }))
            }
            "VOICE_STATE_UPDATE" => {
                let vs: WireVoiceState = serde_json::from_value(data)?;
                vs.guild_id.map(|guild| {
                    GatewayEvent::VoiceStateUpdated(VoiceStateChange {
                        guild: GuildId::new(guild),
                        user: UserId::new(vs.user_id),
                        channel: vs.channel_id.filter(|c| !c.is_empty()).map(ChannelId::new),
                    })
                })
            }
            _ => None,
        };
        Ok(event)
    }
}
