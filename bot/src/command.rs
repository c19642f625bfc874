//! Text command parsing.

use hush_gateway::Author;

/// A recognised bot command.
///
/// Commands that act on a user take the first mention in the message; a
/// missing mention is kept as `None` so the handler can reply with usage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Ping,
    Help,
    Debug,
    Mute { target: Option<Author> },
    MuteInfo { target: Option<Author> },
    MuteStatus,
    Clean { target: Option<Author> },
    Servers,
}

impl Command {
    /// Parses `content` when it starts with `prefix` followed by a known
    /// command word. Anything else is not a command.
    pub fn parse(prefix: &str, content: &str, mentions: &[Author]) -> Option<Self> {
        let rest = content.trim_start().strip_prefix(prefix)?;
        let word = rest.split_whitespace().next()?;
        let first_mention = || mentions.first().cloned();

        let command = match word.to_ascii_lowercase().as_str() {
            "ping" => Command::Ping,
            "help" => Command::Help,
            "debug" => Command::Debug,
            "mute" => Command::Mute {
                target: first_mention(),
            },
            "muteinfo" => Command::MuteInfo {
                target: first_mention(),
            },
            "mutestatus" => Command::MuteStatus,
            "clean" => Command::Clean {
                target: first_mention(),
            },
            "servers" => Command::Servers,
            _ => return None,
        };
        Some(command)
    }

    /// Counter name for this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ping => "ping",
            Command::Help => "help",
            Command::Debug => "debug",
            Command::Mute { .. } => "mute",
            Command::MuteInfo { .. } => "muteinfo",
            Command::MuteStatus => "mutestatus",
            Command::Clean { .. } => "clean",
            Command::Servers => "servers",
        }
    }
}
