//! User-facing notice text.

use std::collections::BTreeMap;

use hush_gateway::{Author, GuildSummary};
use hush_moderation::Rejection;
use hush_types::{ChannelId, GuildId, ModerationParams};
use hush_utils::format_duration;

pub fn pong() -> String {
    "Pong! 🏓".to_string()
}

pub fn mute_usage(prefix: &str) -> String {
    format!("⚠️ You must mention a user to vote to mute them. Example: `{prefix}mute @user`")
}

pub fn clean_usage(prefix: &str) -> String {
    format!("❌ Please mention a user to clear their votes. Example: `{prefix}clean @user`")
}

pub fn rejected(rejection: &Rejection, target: &str) -> String {
    match rejection {
        Rejection::SelfVote => "⚠️ You can't vote to mute yourself.".to_string(),
        Rejection::ExemptTarget => "⚠️ You can't vote to mute a bot.".to_string(),
        Rejection::AlreadyMuted { remaining_secs } => format!(
            "🔇 {target} is already muted in voice channels. The mute will end in {}.",
            format_duration(*remaining_secs)
        ),
        Rejection::DuplicateVote { remaining_secs } => format!(
            "⚠️ You've already voted to mute {target}. Your vote expires in {}.",
            format_duration(*remaining_secs)
        ),
    }
}

pub fn vote_recorded(target: &str, count: usize, needed: usize, vote_ttl_secs: u64) -> String {
    format!(
        "✅ Vote registered against {target}. Current votes: {count}/{needed}\n\
         Your vote expires in {}.",
        format_duration(vote_ttl_secs)
    )
}

pub fn muted(target: &str, in_voice: bool, mute_ttl_secs: u64) -> String {
    let duration = format_duration(mute_ttl_secs);
    if in_voice {
        format!("🔇 {target} has been muted in voice channels for {duration}.")
    } else {
        format!(
            "🔇 {target} will be muted when they join a voice channel. The mute will last {duration}."
        )
    }
}

pub fn mute_failed(target: &str) -> String {
    format!("❌ Error muting {target}. The bot may lack permission to mute members.")
}

/// One voter line in a detailed status report.
pub struct VoterLine {
    pub name: String,
    pub remaining_secs: u64,
}

pub fn no_votes_for(target: &str) -> String {
    format!("📊 No active votes to mute {target}.")
}

pub fn status_detail(
    target: &str,
    voters: &[VoterLine],
    needed: usize,
    mute_remaining: Option<u64>,
) -> String {
    let mut msg = format!(
        "📊 Active votes to mute {target} ({}/{needed}):\n```\n",
        voters.len()
    );
    for voter in voters {
        msg.push_str(&format!(
            "{} (expires in: {})\n",
            voter.name,
            format_duration(voter.remaining_secs)
        ));
    }
    msg.push_str("```");
    if let Some(remaining) = mute_remaining {
        msg.push_str(&format!(
            "\n🔇 {target} is muted. Time remaining: {}",
            format_duration(remaining)
        ));
    }
    msg
}

/// One target line in the all-users listing.
pub struct ActiveLine {
    pub name: String,
    pub votes: usize,
    pub mute_remaining: Option<u64>,
}

pub fn active_listing(lines: &[ActiveLine], needed: usize, prefix: &str) -> String {
    if lines.is_empty() {
        return "📊 No active votes for any user.".to_string();
    }
    let mut msg = String::from("📊 **Users with active votes:**\n\n");
    for line in lines {
        match line.mute_remaining {
            Some(remaining) => msg.push_str(&format!(
                "🔇 **{}**: Muted in voice for {} more. Votes: {}/{needed}\n",
                line.name,
                format_duration(remaining),
                line.votes
            )),
            None => msg.push_str(&format!(
                "📊 **{}**: Votes: {}/{needed}\n",
                line.name, line.votes
            )),
        }
    }
    msg.push_str(&format!(
        "\nUse `{prefix}muteinfo @user` to see details of a specific user."
    ));
    msg
}

pub fn mute_status(params: &ModerationParams) -> String {
    format!(
        "📋 **Mute system status:**\n\
         - Votes needed: **{}**\n\
         - Vote duration: **{}**\n\
         - Mute duration: **{}**",
        params.votes_needed,
        format_duration(params.vote_ttl_secs),
        format_duration(params.mute_ttl_secs)
    )
}

pub fn help(prefix: &str, params: &ModerationParams) -> String {
    format!(
        "📌 **Voice Mute Commands:**\n\n\
         **{prefix}mute @user** - Vote to mute the mentioned user in voice channels\n\
         **{prefix}muteinfo** - Show all users with active votes\n\
         **{prefix}muteinfo @user** - Show votes for a specific user\n\
         **{prefix}mutestatus** - Show mute system configuration\n\
         **{prefix}clean @user** - (Administrators only) Remove all votes against a user\n\
         **{prefix}servers** - List the servers I belong to\n\
         **{prefix}help** - Show this help message\n\n\
         **{} votes** are needed to mute a user for **{}**. The mute only affects voice channels.",
        params.votes_needed,
        format_duration(params.mute_ttl_secs)
    )
}

pub fn debug_info(
    author: &Author,
    channel: &ChannelId,
    guild: &GuildId,
    records: usize,
    counters: &BTreeMap<&'static str, u64>,
) -> String {
    let mut msg = format!(
        "```\nDebug Information:\n\
         - User: {}\n\
         - User ID: {}\n\
         - Channel: {channel}\n\
         - Server: {guild}\n\
         - Users in store: {records}\n",
        author.username, author.id
    );
    for (name, value) in counters {
        msg.push_str(&format!("- {name}: {value}\n"));
    }
    msg.push_str("```");
    msg
}

pub fn servers(guilds: &[GuildSummary]) -> String {
    let mut msg = String::from("🤖 **Servers I belong to:**\n\n");
    if guilds.is_empty() {
        msg.push_str("I'm not in any server. Invite me using the generated link!\n");
        return msg;
    }
    for (i, guild) in guilds.iter().enumerate() {
        msg.push_str(&format!("{}. **{}** (ID: {})\n", i + 1, guild.name, guild.id));
        match guild.member_count {
            Some(count) => msg.push_str(&format!("   - Members: {count}\n")),
            None => msg.push_str("   - Members: unknown\n"),
        }
        match &guild.bot_roles {
            None => msg.push_str("   - Roles: Error getting roles\n"),
            Some(roles) if roles.is_empty() => {
                msg.push_str("   - Roles: I don't have assigned roles ⚠️\n")
            }
            Some(roles) => msg.push_str(&format!("   - Roles: {}\n", roles.join(", "))),
        }
        msg.push('\n');
    }
    msg
}

pub fn servers_failed() -> String {
    "❌ Error listing the servers I belong to.".to_string()
}

pub fn not_admin() -> String {
    "❌ You don't have administrator permissions to use this command.".to_string()
}

pub fn admin_check_failed() -> String {
    "❌ Error verifying administrator permissions.".to_string()
}

pub fn nothing_to_clear(target: &str) -> String {
    format!("The user {target} doesn't have active votes.")
}

pub fn unmuted_by_admin(target: &str) -> String {
    format!("🔊 {target} has been unmuted by an administrator.")
}

pub fn unmute_failed(target: &str) -> String {
    format!("⚠️ Error unmuting {target}.")
}

pub fn cleared(target: &str) -> String {
    format!("🧹 All votes against {target} have been removed.")
}
