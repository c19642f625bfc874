//! hush daemon: entry point for running the vote-to-mute bot.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use hush_bot::{BotConfig, HushBot, ShutdownController, ShutdownReason};
use hush_gateway::{invite_link, is_valid_client_id, DiscordRest, Gateway, GatewaySession};
use hush_moderation::SystemClock;

#[derive(Parser)]
#[command(name = "hush-daemon", about = "Crowd-moderated voice mute bot")]
struct Cli {
    /// Bot token. Prefer the environment variable over the flag.
    #[arg(long, env = "HUSH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Directory holding the snapshot file.
    #[arg(long, env = "HUSH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Directory receiving the daily CSV audit files.
    #[arg(long, env = "HUSH_AUDIT_DIR")]
    audit_dir: Option<PathBuf>,

    /// Disable the CSV audit log.
    #[arg(long, env = "HUSH_DISABLE_AUDIT")]
    disable_audit: bool,

    /// Command prefix, e.g. "!".
    #[arg(long, env = "HUSH_PREFIX")]
    prefix: Option<String>,

    /// Live votes needed to mute.
    #[arg(long, env = "HUSH_VOTES_NEEDED")]
    votes_needed: Option<usize>,

    /// Lifetime of a single vote, in seconds.
    #[arg(long, env = "HUSH_VOTE_TTL_SECS")]
    vote_ttl_secs: Option<u64>,

    /// Duration of a mute, in seconds.
    #[arg(long, env = "HUSH_MUTE_TTL_SECS")]
    mute_ttl_secs: Option<u64>,

    /// Log format: "human" or "json".
    #[arg(long, env = "HUSH_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "HUSH_LOG_LEVEL")]
    log_level: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "HUSH_CONFIG")]
    config: Option<PathBuf>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Connect to the gateway and moderate until interrupted.
    Run,
    /// Print the effective configuration (token redacted) and exit.
    ShowConfig,
    /// Print the link that adds the bot to a server.
    InviteLink {
        /// Application id from the developer portal.
        #[arg(long, env = "HUSH_CLIENT_ID")]
        client_id: String,
    },
}

impl Cli {
    /// File config (or defaults) with CLI/env overrides applied.
    fn effective_config(&self) -> anyhow::Result<BotConfig> {
        let base = match &self.config {
            Some(path) => {
                let path = path.to_string_lossy();
                BotConfig::from_toml_file(&path)
                    .with_context(|| format!("loading config file {path}"))?
            }
            None => BotConfig::default(),
        };

        Ok(BotConfig {
            token: self.token.clone().unwrap_or(base.token),
            data_dir: self.data_dir.clone().unwrap_or(base.data_dir),
            audit_dir: self.audit_dir.clone().unwrap_or(base.audit_dir),
            enable_audit: base.enable_audit && !self.disable_audit,
            command_prefix: self.prefix.clone().unwrap_or(base.command_prefix),
            votes_needed: self.votes_needed.unwrap_or(base.votes_needed),
            vote_ttl_secs: self.vote_ttl_secs.unwrap_or(base.vote_ttl_secs),
            mute_ttl_secs: self.mute_ttl_secs.unwrap_or(base.mute_ttl_secs),
            log_format: self.log_format.clone().unwrap_or(base.log_format),
            log_level: self.log_level.clone().unwrap_or(base.log_level),
            ..base
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Run => run(cli.effective_config()?).await,
        Command::InviteLink { client_id } => print_invite_links(client_id.trim()),
        Command::ShowConfig => {
            let config = cli.effective_config()?;
            let redacted = BotConfig {
                token: if config.token.is_empty() {
                    String::new()
                } else {
                    "<redacted>".to_string()
                },
                ..config
            };
            print!("{}", redacted.to_toml_string()?);
            Ok(())
        }
    }
}

fn print_invite_links(client_id: &str) -> anyhow::Result<()> {
    anyhow::ensure!(
        is_valid_client_id(client_id),
        "client id must be the numeric application id, got {client_id:?}"
    );
    println!("Invite link:");
    println!("{}", invite_link(client_id, false));
    println!();
    println!("If that link is refused, try the one with application commands:");
    println!("{}", invite_link(client_id, true));
    println!();
    println!("The bot also needs the SERVER MEMBERS and MESSAGE CONTENT privileged intents");
    println!("enabled in the developer portal.");
    Ok(())
}

async fn run(config: BotConfig) -> anyhow::Result<()> {
    config.validate()?;
    hush_utils::init_logging(config.log_format()?, &config.log_level);

    tracing::info!(
        snapshot = %config.snapshot_path().display(),
        votes_needed = config.votes_needed,
        vote_ttl_secs = config.vote_ttl_secs,
        mute_ttl_secs = config.mute_ttl_secs,
        audit = config.enable_audit,
        "starting hush"
    );

    let gateway: Arc<dyn Gateway> = Arc::new(DiscordRest::with_base(&config.token, &config.api_base));
    let (bot, events_tx, events_rx) = HushBot::from_config(&config, gateway, Arc::new(SystemClock))?;

    let report = bot.restore().await;
    if let Some(e) = &report.discarded {
        tracing::warn!(error = %e, "previous snapshot discarded");
    }

    let shutdown = ShutdownController::new();
    let bot_shutdown = shutdown.subscribe();
    let session_shutdown = shutdown.subscribe();

    let signal_controller = shutdown.clone();
    tokio::spawn(async move { signal_controller.wait_for_signal().await });

    // A dead gateway session takes the bot down with it; there is no resume.
    let session = GatewaySession::new(&config.gateway_url, &config.token);
    let session_controller = shutdown.clone();
    let session_task = tokio::spawn(async move {
        let result = session.run(events_tx, session_shutdown).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "gateway session ended");
        }
        session_controller.trigger(ShutdownReason::GatewayClosed);
        result
    });

    bot.run(events_rx, bot_shutdown).await?;
    session_task
        .await
        .context("gateway session task panicked")??;

    tracing::info!(reason = ?shutdown.reason(), "hush daemon exited cleanly");
    Ok(())
}
