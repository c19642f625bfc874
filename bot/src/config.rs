//! Bot configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use hush_gateway::{DEFAULT_API_BASE, DEFAULT_GATEWAY_URL};
use hush_types::params::{DEFAULT_MUTE_TTL_SECS, DEFAULT_VOTES_NEEDED, DEFAULT_VOTE_TTL_SECS};
use hush_types::ModerationParams;
use hush_utils::LogFormat;

use crate::BotError;

/// Token values shipped in sample configs; treated as "not configured".
const PLACEHOLDER_TOKENS: &[&str] = &["", "YOUR_TOKEN_HERE", "changeme"];

/// Configuration for the hush bot.
///
/// Can be loaded from a TOML file via [`BotConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot token used for both the REST API and the gateway session.
    #[serde(default)]
    pub token: String,

    /// Directory holding the snapshot file.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Snapshot file name, relative to `data_dir`.
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,

    /// Directory receiving the daily CSV audit files.
    #[serde(default = "default_audit_dir")]
    pub audit_dir: PathBuf,

    #[serde(default = "default_true")]
    pub enable_audit: bool,

    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    #[serde(default = "default_votes_needed")]
    pub votes_needed: usize,

    #[serde(default = "default_vote_ttl_secs")]
    pub vote_ttl_secs: u64,

    #[serde(default = "default_mute_ttl_secs")]
    pub mute_ttl_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./hush_data")
}

fn default_snapshot_file() -> String {
    "mute_data.json".to_string()
}

fn default_audit_dir() -> PathBuf {
    PathBuf::from("./logs")
}

fn default_true() -> bool {
    true
}

fn default_command_prefix() -> String {
    "!".to_string()
}

fn default_votes_needed() -> usize {
    DEFAULT_VOTES_NEEDED
}

fn default_vote_ttl_secs() -> u64 {
    DEFAULT_VOTE_TTL_SECS
}

fn default_mute_ttl_secs() -> u64 {
    DEFAULT_MUTE_TTL_SECS
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_gateway_url() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl BotConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, BotError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BotError::Config(format!("{path}: {e}")))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, BotError> {
        toml::from_str(s).map_err(|e| BotError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, BotError> {
        toml::to_string_pretty(self).map_err(|e| BotError::Config(e.to_string()))
    }

    pub fn moderation_params(&self) -> ModerationParams {
        ModerationParams {
            votes_needed: self.votes_needed,
            vote_ttl_secs: self.vote_ttl_secs,
            mute_ttl_secs: self.mute_ttl_secs,
        }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.snapshot_file)
    }

    pub fn log_format(&self) -> Result<LogFormat, BotError> {
        self.log_format.parse().map_err(BotError::Config)
    }

    /// Startup checks: a real token, a usable prefix and sane parameters.
    pub fn validate(&self) -> Result<(), BotError> {
        if PLACEHOLDER_TOKENS.contains(&self.token.trim()) {
            return Err(BotError::Config(
                "no bot token configured (set `token` or HUSH_TOKEN)".into(),
            ));
        }
        if self.command_prefix.trim().is_empty() {
            return Err(BotError::Config("command_prefix must not be empty".into()));
        }
        if self.snapshot_file.trim().is_empty() {
            return Err(BotError::Config("snapshot_file must not be empty".into()));
        }
        self.moderation_params()
            .validate()
            .map_err(|e| BotError::Config(e.to_string()))?;
        self.log_format()?;
        Ok(())
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            data_dir: default_data_dir(),
            snapshot_file: default_snapshot_file(),
            audit_dir: default_audit_dir(),
            enable_audit: default_true(),
            command_prefix: default_command_prefix(),
            votes_needed: default_votes_needed(),
            vote_ttl_secs: default_vote_ttl_secs(),
            mute_ttl_secs: default_mute_ttl_secs(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            api_base: default_api_base(),
            gateway_url: default_gateway_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_token() -> BotConfig {
        BotConfig {
            token: "abc.def.ghi".into(),
            ..BotConfig::default()
        }
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = BotConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.votes_needed, 5);
        assert_eq!(config.vote_ttl_secs, 600);
        assert_eq!(config.mute_ttl_secs, 300);
        assert_eq!(config.command_prefix, "!");
        assert_eq!(config.snapshot_path(), PathBuf::from("./hush_data/mute_data.json"));
        assert!(config.enable_audit);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            token = "secret"
            votes_needed = 3
            command_prefix = "?"
            log_format = "json"
        "#;
        let config = BotConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.votes_needed, 3);
        assert_eq!(config.command_prefix, "?");
        assert_eq!(config.log_format().unwrap(), LogFormat::Json);
        assert_eq!(config.mute_ttl_secs, 300); // default
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_config_survives_toml() {
        let config = with_token();
        let text = config.to_toml_string().unwrap();
        let parsed = BotConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.token, config.token);
        assert_eq!(parsed.gateway_url, config.gateway_url);
    }

    #[test]
    fn missing_or_placeholder_token_is_rejected() {
        assert!(matches!(BotConfig::default().validate(), Err(BotError::Config(_))));
        let placeholder = BotConfig {
            token: "YOUR_TOKEN_HERE".into(),
            ..BotConfig::default()
        };
        assert!(placeholder.validate().is_err());
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let config = BotConfig {
            votes_needed: 0,
            ..with_token()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let config = BotConfig {
            log_format: "xml".into(),
            ..with_token()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = BotConfig::from_toml_file("/nonexistent/hush.toml");
        assert!(matches!(result, Err(BotError::Config(_))));
    }
}
