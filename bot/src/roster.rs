//! Who is currently in a voice channel, as seen from presence events.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use hush_gateway::VoiceStateChange;
use hush_types::{GuildId, UserId};

/// Members seen in voice since the session started. Only used to word
/// notices; moderation decisions never depend on it.
#[derive(Debug, Default)]
pub struct VoiceRoster {
    members: Mutex<HashSet<(GuildId, UserId)>>,
}

impl VoiceRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, change: &VoiceStateChange) {
        let mut members = self.members.lock().unwrap_or_else(PoisonError::into_inner);
        let key = (change.guild.clone(), change.user.clone());
        if change.channel.is_some() {
            members.insert(key);
        } else {
            members.remove(&key);
        }
    }

    pub fn in_voice(&self, guild: &GuildId, user: &UserId) -> bool {
        self.members
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(guild.clone(), user.clone()))
    }
}
