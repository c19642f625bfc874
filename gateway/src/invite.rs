//! OAuth2 links that add the bot to a guild.

/// Permission set requested by the invite: Administrator.
pub const INVITE_PERMISSIONS: u64 = 1 << 3;

const AUTHORIZE_URL: &str = "https://discord.com/api/oauth2/authorize";

/// Builds the invite link for application `client_id`.
///
/// `with_commands` also requests the `applications.commands` scope, which
/// some guild settings require before a bot can be added.
pub fn invite_link(client_id: &str, with_commands: bool) -> String {
    let scope = if with_commands {
        "bot%20applications.commands"
    } else {
        "bot"
    };
    format!("{AUTHORIZE_URL}?client_id={client_id}&permissions={INVITE_PERMISSIONS}&scope={scope}")
}

/// Application ids are snowflakes: non-empty and all digits.
pub fn is_valid_client_id(client_id: &str) -> bool {
    !client_id.is_empty() && client_id.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_scope_link() {
        assert_eq!(
            invite_link("123456", false),
            "https://discord.com/api/oauth2/authorize?client_id=123456&permissions=8&scope=bot"
        );
    }

    #[test]
    fn commands_scope_is_url_encoded() {
        assert!(invite_link("123456", true).ends_with("&scope=bot%20applications.commands"));
    }

    #[test]
    fn client_id_must_be_numeric() {
        assert!(is_valid_client_id("1187654321098765432"));
        assert!(!is_valid_client_id(""));
        assert!(!is_valid_client_id("12ab"));
        assert!(!is_valid_client_id(" 123"));
    }
}
