//! Messaging-gateway interface for hush.
//!
//! The moderation core talks to the chat platform only through the
//! [`Gateway`] trait: send a notice, toggle a member's voice mute, resolve a
//! display name, check administrator rights and list the bot's guilds.
//! Inbound traffic arrives as [`GatewayEvent`]s.
//!
//! Discord-backed pieces:
//! - [`DiscordRest`]: the `Gateway` implementation over the HTTP API.
//! - [`GatewaySession`]: a minimal gateway websocket reader that turns
//!   dispatches into `GatewayEvent`s (no resume or reconnect).
//! - [`invite_link`]: the OAuth2 link that adds the bot to a guild.

pub mod error;
pub mod event;
pub mod gateway;
pub mod invite;
pub mod rest;
pub mod session;

pub use error::GatewayError;
pub use event::{Author, GatewayEvent, IncomingMessage, VoiceStateChange};
pub use gateway::{display_name_or_placeholder, Gateway, GuildSummary};
pub use invite::{invite_link, is_valid_client_id, INVITE_PERMISSIONS};
pub use rest::{DiscordRest, DEFAULT_API_BASE};
pub use session::{GatewaySession, DEFAULT_GATEWAY_URL, DEFAULT_INTENTS};
