//! Platform identities (users, guilds, channels).
//!
//! Identities are opaque snowflake strings issued by the messaging platform.
//! They are compared and ordered as strings; hush never interprets them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::HushError;

macro_rules! platform_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw platform identifier.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Parse an identifier, rejecting empty or whitespace-bearing input.
            pub fn parse(raw: &str) -> Result<Self, HushError> {
                if raw.is_empty() || raw.chars().any(char::is_whitespace) {
                    return Err(HushError::InvalidId(format!("{} id {raw:?}", $kind)));
                }
                Ok(Self(raw.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }
    };
}

platform_id!(
    /// A user identity: a vote target, a voter or a message author.
    UserId,
    "user"
);

platform_id!(
    /// A guild (server) identity. Voice mutes are applied per guild.
    GuildId,
    "guild"
);

platform_id!(
    /// A text channel identity, used to address notices.
    ChannelId,
    "channel"
);
