//! The serialized moderation entry points.
//!
//! Every operation that reads and then writes the store runs under one
//! whole-store async lock, held across the platform mute call and the
//! snapshot write that follows it. Two concurrent votes for the same target
//! therefore see each other's effects and at most one of them mutes.

use std::sync::Arc;
use std::time::Duration;

use hush_gateway::Gateway;
use hush_store::{RecordStore, SnapshotStore, StoreError};
use hush_types::{ChannelId, GuildId, ModerationParams, Timestamp, UserId, VoteRecord};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::aggregator::{self, Ballot};
use crate::mute;
use crate::outcome::{ClearOutcome, ExpiryOutcome, PresenceOutcome, VoteOutcome};
use crate::presence::{self, PresenceDecision};
use crate::{Clock, ModerationError, UnmuteScheduler};

/// What happened when loading the snapshot at startup.
#[derive(Debug, Default)]
pub struct RestoreReport {
    /// Records now in the store.
    pub records: usize,
    /// Unmute timers re-armed for records still flagged as muted.
    pub rearmed: usize,
    /// Set when a snapshot existed but could not be read; the store is empty.
    pub discarded: Option<StoreError>,
}

pub struct Moderator {
    params: ModerationParams,
    store: Arc<dyn RecordStore>,
    snapshots: Arc<dyn SnapshotStore>,
    gateway: Arc<dyn Gateway>,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn UnmuteScheduler>,
    /// Serializes read-modify-write sequences and their snapshot writes.
    /// Holds the last mute epoch issued.
    write_lock: Mutex<u64>,
}

impl Moderator {
    pub fn new(
        params: ModerationParams,
        store: Arc<dyn RecordStore>,
        snapshots: Arc<dyn SnapshotStore>,
        gateway: Arc<dyn Gateway>,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn UnmuteScheduler>,
    ) -> Result<Self, ModerationError> {
        params.validate()?;
        Ok(Self {
            params,
            store,
            snapshots,
            gateway,
            clock,
            scheduler,
            write_lock: Mutex::new(0),
        })
    }

    pub fn params(&self) -> &ModerationParams {
        &self.params
    }

    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn record_count(&self) -> usize {
        self.store.len()
    }

    /// Loads the last snapshot into the store and re-arms unmute timers for
    /// every record still flagged as muted. A lapsed mute gets a zero-delay
    /// timer so the next tick reverses it.
    ///
    /// A missing snapshot starts empty. An unreadable one is logged, reported
    /// in the result, and also starts empty.
    pub async fn restore(&self) -> RestoreReport {
        let mut last_epoch = self.write_lock.lock().await;

        let records = match self.snapshots.load() {
            Ok(Some(records)) => records,
            Ok(None) => {
                info!("no snapshot found, starting with an empty store");
                return RestoreReport::default();
            }
            Err(e) => {
                error!(error = %e, "snapshot unreadable, starting with an empty store");
                self.store.replace_all(Default::default());
                return RestoreReport {
                    discarded: Some(e),
                    ..Default::default()
                };
            }
        };

        let now = self.clock.now();
        let mut rearmed = 0;
        for (target, record) in records.iter().filter(|(_, r)| r.is_muted) {
            let after = Duration::from_secs(record.mute_expiry.secs_until(now));
            self.scheduler
                .schedule_unmute(target, record.mute_epoch, after);
            rearmed += 1;
        }

        if let Some(max) = records.values().map(|r| r.mute_epoch).max() {
            *last_epoch = (*last_epoch).max(max);
        }

        let report = RestoreReport {
            records: records.len(),
            rearmed,
            discarded: None,
        };
        self.store.replace_all(records);
        info!(records = report.records, rearmed, "restored moderation state");
        report
    }

    /// Records `ballot.voter`'s vote against `ballot.target` and mutes the
    /// target when the live vote count reaches the threshold.
    pub async fn cast_vote(&self, ballot: &Ballot) -> VoteOutcome {
        if let Err(rejection) = ballot.check_eligibility() {
            debug!(target_user = %ballot.target, voter = %ballot.voter, ?rejection, "vote rejected");
            return VoteOutcome::Rejected(rejection);
        }

        let mut last_epoch = self.write_lock.lock().await;
        let now = self.clock.now();
        let needed = self.params.votes_needed;

        let mut record = self.store.get(&ballot.target).unwrap_or_default();
        let tally = match aggregator::apply_vote(&mut record, &ballot.voter, now, &self.params) {
            Ok(tally) => tally,
            Err(rejection) => {
                debug!(target_user = %ballot.target, voter = %ballot.voter, ?rejection, "vote rejected");
                return VoteOutcome::Rejected(rejection);
            }
        };
        info!(
            target_user = %ballot.target,
            voter = %ballot.voter,
            count = tally.count,
            needed,
            "vote recorded"
        );

        if !tally.threshold_met {
            self.store.put(&ballot.target, record);
            self.persist();
            return VoteOutcome::Recorded {
                count: tally.count,
                needed,
                vote_expires_at: tally.vote_expires_at,
            };
        }

        let epoch = (*last_epoch).max(record.mute_epoch) + 1;
        let muted = mute::enter_muted(
            self.gateway.as_ref(),
            &ballot.guild,
            &ballot.target,
            &mut record,
            now,
            self.params.mute_ttl_secs,
            epoch,
        )
        .await;

        let outcome = match muted {
            Ok(()) => {
                *last_epoch = epoch;
                info!(
                    target_user = %ballot.target,
                    guild = %ballot.guild,
                    until = %record.mute_expiry,
                    epoch,
                    "threshold reached, user muted"
                );
                self.scheduler.schedule_unmute(
                    &ballot.target,
                    epoch,
                    Duration::from_secs(self.params.mute_ttl_secs),
                );
                VoteOutcome::Muted {
                    count: tally.count,
                    needed,
                    mute_expires_at: record.mute_expiry,
                }
            }
            Err(error) => {
                warn!(
                    target_user = %ballot.target,
                    guild = %ballot.guild,
                    error = %error,
                    "threshold reached but platform mute failed"
                );
                VoteOutcome::MuteFailed {
                    count: tally.count,
                    needed,
                    error,
                }
            }
        };

        self.store.put(&ballot.target, record);
        self.persist();
        outcome
    }

    /// The record for `target` with expired votes swept out, or `None` if
    /// the target has never been voted on (or was cleared).
    pub async fn query_status(&self, target: &UserId) -> Option<VoteRecord> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let mut record = self.store.get(target)?;
        if aggregator::sweep_expired(&mut record, now) > 0 {
            self.store.put(target, record.clone());
            self.persist();
        }
        Some(record)
    }

    /// Every target with at least one live vote or a mute flag, in target
    /// order, after sweeping expired votes store-wide. Records left with
    /// nothing to show are kept in the store but omitted from the listing.
    pub async fn query_all_active(&self) -> Vec<(UserId, VoteRecord)> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let mut swept = 0;
        let mut records = self.store.export();
        for (target, record) in records.iter_mut() {
            let removed = aggregator::sweep_expired(record, now);
            if removed > 0 {
                self.store.put(target, record.clone());
                swept += removed;
            }
        }
        if swept > 0 {
            debug!(swept, "expired votes removed during listing");
            self.persist();
        }

        records
            .into_iter()
            .filter(|(_, r)| !r.votes.is_empty() || r.is_muted)
            .collect()
    }

    /// Administrative clear: unmutes `target` if muted, then deletes the
    /// record outright. Any pending timer for it becomes a no-op.
    ///
    /// `guild` is used for the unmute only when the record does not say
    /// where the mute was applied.
    pub async fn clear(&self, target: &UserId, guild: &GuildId) -> ClearOutcome {
        let _guard = self.write_lock.lock().await;

        let Some(mut record) = self.store.get(target) else {
            debug!(target_user = %target, "clear requested for unknown user");
            return ClearOutcome::NoRecord;
        };

        let was_muted = record.is_muted;
        let unmute_error =
            match mute::leave_muted(self.gateway.as_ref(), Some(guild), target, &mut record).await {
                Ok(()) => None,
                Err(e) => {
                    warn!(target_user = %target, error = %e, "unmute during clear failed");
                    Some(e)
                }
            };

        self.store.delete(target);
        self.persist();
        info!(target_user = %target, was_muted, "record cleared");
        ClearOutcome::Cleared {
            was_muted,
            unmute_error,
        }
    }

    /// Reacts to `target` joining (`channel` is `Some`) or leaving voice.
    pub async fn on_presence(
        &self,
        guild: &GuildId,
        target: &UserId,
        channel: Option<&ChannelId>,
    ) -> PresenceOutcome {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let mut record = self.store.get(target);
        match presence::decide(record.as_ref(), channel.is_some(), now) {
            PresenceDecision::Ignore => PresenceOutcome::Ignored,
            PresenceDecision::Reassert => {
                match self.gateway.set_voice_mute(guild, target, true).await {
                    Ok(()) => {
                        info!(target_user = %target, guild = %guild, "mute re-applied on voice join");
                        PresenceOutcome::Reasserted
                    }
                    Err(e) => {
                        warn!(target_user = %target, guild = %guild, error = %e, "failed to re-apply mute");
                        PresenceOutcome::ReassertFailed(e)
                    }
                }
            }
            PresenceDecision::Expire => {
                let Some(record) = record.as_mut() else {
                    return PresenceOutcome::Ignored;
                };
                let error = self.unmute_and_store(target, Some(guild), record).await;
                info!(target_user = %target, "lapsed mute reversed on presence change");
                PresenceOutcome::Unmuted { error }
            }
        }
    }

    /// Timer callback: reverses the mute armed with `epoch`, unless the
    /// record has since been cleared, unmuted, or muted again.
    pub async fn expire_mute(&self, target: &UserId, epoch: u64) -> ExpiryOutcome {
        let _guard = self.write_lock.lock().await;

        let Some(mut record) = self.store.get(target) else {
            debug!(target_user = %target, epoch, "unmute timer for unknown user ignored");
            return ExpiryOutcome::Stale;
        };
        if !record.is_muted || record.mute_epoch != epoch {
            debug!(
                target_user = %target,
                epoch,
                current_epoch = record.mute_epoch,
                "stale unmute timer ignored"
            );
            return ExpiryOutcome::Stale;
        }

        let guild = record.mute_guild.clone();
        let error = self.unmute_and_store(target, None, &mut record).await;
        info!(target_user = %target, epoch, "mute expired");
        ExpiryOutcome::Unmuted { guild, error }
    }

    /// Writes the current store to the snapshot backend.
    pub async fn flush(&self) -> Result<(), ModerationError> {
        let _guard = self.write_lock.lock().await;
        self.snapshots.save(&self.store.export())?;
        Ok(())
    }

    async fn unmute_and_store(
        &self,
        target: &UserId,
        fallback_guild: Option<&GuildId>,
        record: &mut VoteRecord,
    ) -> Option<hush_gateway::GatewayError> {
        let result = mute::leave_muted(self.gateway.as_ref(), fallback_guild, target, record).await;
        self.store.put(target, record.clone());
        self.persist();
        match result {
            Ok(()) => None,
            Err(e) => {
                warn!(target_user = %target, error = %e, "platform unmute failed, local state cleared");
                Some(e)
            }
        }
    }

    /// Saves the whole store. Failures are logged and swallowed: the
    /// in-memory state stays authoritative until the next successful save.
    fn persist(&self) {
        if let Err(e) = self.snapshots.save(&self.store.export()) {
            error!(error = %e, "failed to persist snapshot");
        }
    }
}
