//! The bot event loop: turns gateway events and timer expiries into
//! moderation calls and user-facing notices.

use std::sync::Arc;

use hush_gateway::{
    display_name_or_placeholder, Author, Gateway, GatewayEvent, IncomingMessage, VoiceStateChange,
};
use hush_moderation::{
    Ballot, Clock, ClearOutcome, ExpiryOutcome, Moderator, PresenceOutcome, RestoreReport,
    VoteOutcome,
};
use hush_store::MemoryRecordStore;
use hush_store_json::JsonSnapshotFile;
use hush_types::{ChannelId, GuildId, UserId};
use hush_utils::StatsCounter;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::audit::{AuditAction, AuditEntry, AuditLog, SYSTEM_INITIATOR};
use crate::command::Command;
use crate::notices::{self, ActiveLine, VoterLine};
use crate::roster::VoiceRoster;
use crate::scheduler::TokioScheduler;
use crate::{BotConfig, BotError};

/// Capacity of the inbound event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

const COUNTERS: &[&str] = &[
    "events",
    "commands",
    "votes",
    "rejections",
    "mutes",
    "mute_failures",
    "unmutes",
    "reasserts",
    "clears",
    "notice_failures",
];

/// Everything the event loop reacts to.
#[derive(Clone, Debug)]
pub enum BotEvent {
    Gateway(GatewayEvent),
    /// An unmute timer fired.
    MuteExpired { target: UserId, epoch: u64 },
}

impl From<GatewayEvent> for BotEvent {
    fn from(event: GatewayEvent) -> Self {
        BotEvent::Gateway(event)
    }
}

struct Inner {
    moderator: Arc<Moderator>,
    gateway: Arc<dyn Gateway>,
    audit: Option<AuditLog>,
    roster: VoiceRoster,
    stats: StatsCounter,
    prefix: String,
}

/// Cheap to clone; every clone shares the same moderator and counters.
#[derive(Clone)]
pub struct HushBot {
    inner: Arc<Inner>,
}

impl HushBot {
    pub fn new(moderator: Arc<Moderator>, prefix: impl Into<String>, audit: Option<AuditLog>) -> Self {
        let gateway = moderator.gateway().clone();
        Self {
            inner: Arc::new(Inner {
                moderator,
                gateway,
                audit,
                roster: VoiceRoster::new(),
                stats: StatsCounter::new(COUNTERS),
                prefix: prefix.into(),
            }),
        }
    }

    /// Wires a bot from `config`: in-memory store, JSON snapshot file, tokio
    /// unmute timers and (if enabled) the CSV audit log.
    ///
    /// Returns the bot together with both ends of its event channel. The
    /// sender feeds the gateway session; the receiver goes to [`run`](Self::run).
    pub fn from_config(
        config: &BotConfig,
        gateway: Arc<dyn Gateway>,
        clock: Arc<dyn Clock>,
    ) -> Result<(Self, mpsc::Sender<BotEvent>, mpsc::Receiver<BotEvent>), BotError> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let moderator = Moderator::new(
            config.moderation_params(),
            Arc::new(MemoryRecordStore::default()),
            Arc::new(JsonSnapshotFile::new(config.snapshot_path())),
            gateway,
            clock,
            Arc::new(TokioScheduler::new(tx.clone())),
        )?;
        let audit = config
            .enable_audit
            .then(|| AuditLog::new(config.audit_dir.clone()));
        let bot = Self::new(Arc::new(moderator), config.command_prefix.clone(), audit);
        Ok((bot, tx, rx))
    }

    pub fn moderator(&self) -> &Arc<Moderator> {
        &self.inner.moderator
    }

    pub fn stats(&self) -> &StatsCounter {
        &self.inner.stats
    }

    /// Loads persisted state. Call once before [`run`](Self::run).
    pub async fn restore(&self) -> RestoreReport {
        self.inner.moderator.restore().await
    }

    /// Consumes events until shutdown or until every sender is dropped.
    ///
    /// Each event is handled on its own task; the moderator serializes the
    /// state changes. On exit, in-flight handlers are awaited and a final
    /// snapshot is written.
    pub async fn run(
        &self,
        mut events: mpsc::Receiver<BotEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), BotError> {
        let mut tasks = JoinSet::new();
        info!("event loop started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    info!("event loop shutting down");
                    break;
                }

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "event handler task failed");
                    }
                }

                event = events.recv() => match event {
                    Some(event) => {
                        let bot = self.clone();
                        tasks.spawn(async move { bot.handle(event).await });
                    }
                    None => {
                        info!("event channel closed");
                        break;
                    }
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "event handler task failed during shutdown");
            }
        }

        self.inner.moderator.flush().await?;
        info!("final snapshot written");
        Ok(())
    }

    /// Handles one event to completion.
    pub async fn handle(&self, event: BotEvent) {
        self.inner.stats.increment("events");
        match event {
            BotEvent::Gateway(GatewayEvent::Ready {
                user,
                username,
                guilds,
            }) => {
                info!(user = %user, username = %username, guilds, "gateway session ready");
            }
            BotEvent::Gateway(GatewayEvent::MessageCreated(message)) => {
                self.on_message(message).await;
            }
            BotEvent::Gateway(GatewayEvent::VoiceStateUpdated(change)) => {
                self.on_voice_state(change).await;
            }
            BotEvent::MuteExpired { target, epoch } => {
                self.on_mute_expired(target, epoch).await;
            }
        }
    }

    async fn on_message(&self, message: IncomingMessage) {
        if message.author.bot {
            return;
        }
        let Some(guild) = message.guild.clone() else {
            debug!(channel = %message.channel, "ignoring direct message");
            return;
        };
        let Some(command) =
            Command::parse(&self.inner.prefix, &message.content, &message.mentions)
        else {
            return;
        };

        self.inner.stats.increment("commands");
        debug!(command = command.name(), author = %message.author.id, guild = %guild, "command received");

        let channel = &message.channel;
        let prefix = &self.inner.prefix;
        let params = self.inner.moderator.params();
        match command {
            Command::Ping => self.reply(channel, notices::pong()).await,
            Command::Help => self.reply(channel, notices::help(prefix, params)).await,
            Command::MuteStatus => self.reply(channel, notices::mute_status(params)).await,
            Command::Debug => {
                let text = notices::debug_info(
                    &message.author,
                    channel,
                    &guild,
                    self.inner.moderator.record_count(),
                    &self.inner.stats.snapshot(),
                );
                self.reply(channel, text).await;
            }
            Command::Mute { target: None } => self.reply(channel, notices::mute_usage(prefix)).await,
            Command::Mute {
                target: Some(target),
            } => self.vote(&guild, channel, &message.author, &target).await,
            Command::MuteInfo { target: None } => self.list_active(channel).await,
            Command::MuteInfo {
                target: Some(target),
            } => self.show_status(channel, &target).await,
            Command::Clean { target: None } => {
                self.reply(channel, notices::clean_usage(prefix)).await
            }
            Command::Clean {
                target: Some(target),
            } => self.clean(&guild, channel, &message.author, &target).await,
            Command::Servers => self.list_servers(channel).await,
        }
    }

    async fn vote(&self, guild: &GuildId, channel: &ChannelId, voter: &Author, target: &Author) {
        let ballot = Ballot::new(guild.clone(), target.id.clone(), voter.id.clone()).exempt(target.bot);
        let outcome = self.inner.moderator.cast_vote(&ballot).await;
        let params = self.inner.moderator.params();
        let name = &target.username;

        if let Some(count) = outcome.count() {
            self.inner.stats.increment("votes");
            self.audit(AuditAction::Vote, &voter.username, name, count, guild);
        }

        let text = match outcome {
            VoteOutcome::Rejected(rejection) => {
                self.inner.stats.increment("rejections");
                notices::rejected(&rejection, name)
            }
            VoteOutcome::Recorded { count, needed, .. } => {
                notices::vote_recorded(name, count, needed, params.vote_ttl_secs)
            }
            VoteOutcome::Muted { count, .. } => {
                self.inner.stats.increment("mutes");
                self.audit(AuditAction::Mute, &voter.username, name, count, guild);
                let in_voice = self.inner.roster.in_voice(guild, &target.id);
                notices::muted(name, in_voice, params.mute_ttl_secs)
            }
            VoteOutcome::MuteFailed { .. } => {
                self.inner.stats.increment("mute_failures");
                notices::mute_failed(name)
            }
        };
        self.reply(channel, text).await;
    }

    async fn list_active(&self, channel: &ChannelId) {
        let records = self.inner.moderator.query_all_active().await;
        let now = self.inner.moderator.now();

        let mut lines = Vec::with_capacity(records.len());
        for (target, record) in records {
            lines.push(ActiveLine {
                name: self.display_name(&target).await,
                votes: record.vote_count(),
                mute_remaining: record.mute_remaining(now),
            });
        }
        let text = notices::active_listing(
            &lines,
            self.inner.moderator.params().votes_needed,
            &self.inner.prefix,
        );
        self.reply(channel, text).await;
    }

    async fn show_status(&self, channel: &ChannelId, target: &Author) {
        let now = self.inner.moderator.now();
        let record = self.inner.moderator.query_status(&target.id).await;
        let Some(record) = record.filter(|r| !r.votes.is_empty() || r.mute_active(now)) else {
            self.reply(channel, notices::no_votes_for(&target.username)).await;
            return;
        };

        let mut voters = Vec::with_capacity(record.votes.len());
        for (voter, expiry) in &record.votes {
            voters.push(VoterLine {
                name: self.display_name(voter).await,
                remaining_secs: expiry.secs_until(now),
            });
        }
        let text = notices::status_detail(
            &target.username,
            &voters,
            self.inner.moderator.params().votes_needed,
            record.mute_remaining(now),
        );
        self.reply(channel, text).await;
    }

    async fn list_servers(&self, channel: &ChannelId) {
        let text = match self.inner.gateway.list_guilds().await {
            Ok(guilds) => notices::servers(&guilds),
            Err(e) => {
                warn!(error = %e, "guild listing failed");
                notices::servers_failed()
            }
        };
        self.reply(channel, text).await;
    }

    async fn clean(&self, guild: &GuildId, channel: &ChannelId, admin: &Author, target: &Author) {
        match self.inner.gateway.is_administrator(guild, &admin.id).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(user = %admin.id, guild = %guild, "clear refused, not an administrator");
                self.reply(channel, notices::not_admin()).await;
                return;
            }
            Err(e) => {
                warn!(user = %admin.id, guild = %guild, error = %e, "administrator check failed");
                self.reply(channel, notices::admin_check_failed()).await;
                return;
            }
        }

        let name = &target.username;
        match self.inner.moderator.clear(&target.id, guild).await {
            ClearOutcome::NoRecord => {
                self.reply(channel, notices::nothing_to_clear(name)).await;
            }
            ClearOutcome::Cleared {
                was_muted,
                unmute_error,
            } => {
                self.inner.stats.increment("clears");
                if was_muted {
                    let text = match unmute_error {
                        None => notices::unmuted_by_admin(name),
                        Some(_) => notices::unmute_failed(name),
                    };
                    self.reply(channel, text).await;
                }
                self.audit(AuditAction::Clean, &admin.username, name, 0, guild);
                self.reply(channel, notices::cleared(name)).await;
            }
        }
    }

    async fn on_voice_state(&self, change: VoiceStateChange) {
        self.inner.roster.update(&change);
        let outcome = self
            .inner
            .moderator
            .on_presence(&change.guild, &change.user, change.channel.as_ref())
            .await;
        match outcome {
            PresenceOutcome::Ignored | PresenceOutcome::ReassertFailed(_) => {}
            PresenceOutcome::Reasserted => self.inner.stats.increment("reasserts"),
            PresenceOutcome::Unmuted { .. } => {
                self.inner.stats.increment("unmutes");
                let name = self.display_name(&change.user).await;
                self.audit(AuditAction::Unmute, SYSTEM_INITIATOR, &name, 0, &change.guild);
            }
        }
    }

    async fn on_mute_expired(&self, target: UserId, epoch: u64) {
        if let ExpiryOutcome::Unmuted { guild, .. } =
            self.inner.moderator.expire_mute(&target, epoch).await
        {
            self.inner.stats.increment("unmutes");
            let name = self.display_name(&target).await;
            let guild = guild.map(|g| g.to_string()).unwrap_or_default();
            self.audit_raw(AuditAction::Unmute, SYSTEM_INITIATOR, &name, 0, guild);
        }
    }

    async fn display_name(&self, user: &UserId) -> String {
        display_name_or_placeholder(self.inner.gateway.as_ref(), user).await
    }

    async fn reply(&self, channel: &ChannelId, text: String) {
        if let Err(e) = self.inner.gateway.send_notice(channel, &text).await {
            self.inner.stats.increment("notice_failures");
            warn!(channel = %channel, error = %e, "failed to send notice");
        }
    }

    fn audit(&self, action: AuditAction, initiator: &str, target: &str, votes: usize, guild: &GuildId) {
        self.audit_raw(action, initiator, target, votes, guild.to_string());
    }

    fn audit_raw(&self, action: AuditAction, initiator: &str, target: &str, votes: usize, guild: String) {
        if let Some(audit) = &self.inner.audit {
            audit.record(&AuditEntry {
                at: self.inner.moderator.now(),
                action,
                initiator: initiator.to_string(),
                target: target.to_string(),
                votes,
                guild,
            });
        }
    }
}
