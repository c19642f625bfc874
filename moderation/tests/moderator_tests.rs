//! End-to-end behaviour of the moderator against nullable infrastructure.

use std::sync::Arc;
use std::time::Duration;

use hush_moderation::{
    Ballot, ClearOutcome, ExpiryOutcome, Moderator, PresenceOutcome, Rejection, VoteOutcome,
};
use hush_nullables::{NullClock, NullGateway, NullScheduler, NullSnapshotStore};
use hush_store::{MemoryRecordStore, RecordStore, Records};
use hush_types::{ChannelId, GuildId, ModerationParams, Timestamp, UserId, VoteRecord};

struct Harness {
    moderator: Arc<Moderator>,
    store: Arc<MemoryRecordStore>,
    snapshots: Arc<NullSnapshotStore>,
    gateway: Arc<NullGateway>,
    clock: Arc<NullClock>,
    scheduler: Arc<NullScheduler>,
}

impl Harness {
    fn new() -> Self {
        Self::with_snapshots(NullSnapshotStore::new())
    }

    fn with_snapshots(snapshots: NullSnapshotStore) -> Self {
        let store = Arc::new(MemoryRecordStore::default());
        let snapshots = Arc::new(snapshots);
        let gateway = Arc::new(NullGateway::new());
        let clock = Arc::new(NullClock::new(0));
        let scheduler = Arc::new(NullScheduler::new());
        let moderator = Moderator::new(
            ModerationParams::default(),
            store.clone(),
            snapshots.clone(),
            gateway.clone(),
            clock.clone(),
            scheduler.clone(),
        )
        .unwrap();
        Self {
            moderator: Arc::new(moderator),
            store,
            snapshots,
            gateway,
            clock,
            scheduler,
        }
    }

    async fn vote(&self, target: &str, voter: &str) -> VoteOutcome {
        self.moderator
            .cast_vote(&Ballot::new(guild(), uid(target), uid(voter)))
            .await
    }

    async fn mute_with_five_votes(&self, target: &str) {
        for i in 0..5 {
            self.vote(target, &format!("voter{i}")).await;
        }
    }
}

fn uid(s: &str) -> UserId {
    UserId::new(s)
}

fn guild() -> GuildId {
    GuildId::new("guild")
}

fn voice() -> ChannelId {
    ChannelId::new("voice")
}

#[tokio::test]
async fn first_vote_is_recorded_and_persisted() {
    let h = Harness::new();
    h.clock.set(1_000);

    let outcome = h.vote("x", "a").await;
    match outcome {
        VoteOutcome::Recorded {
            count,
            needed,
            vote_expires_at,
        } => {
            assert_eq!(count, 1);
            assert_eq!(needed, 5);
            assert_eq!(vote_expires_at, Timestamp::new(1_600));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let saved = h.snapshots.saved().unwrap();
    assert_eq!(
        saved[&uid("x")].votes.get(&uid("a")),
        Some(&Timestamp::new(1_600))
    );
    assert!(h.gateway.mute_calls().is_empty());
}

#[tokio::test]
async fn self_vote_leaves_no_record() {
    let h = Harness::new();
    let outcome = h.vote("a", "a").await;
    assert!(matches!(outcome, VoteOutcome::Rejected(Rejection::SelfVote)));
    assert!(h.store.is_empty());
    assert_eq!(h.snapshots.save_count(), 0);
}

#[tokio::test]
async fn exempt_target_leaves_no_record() {
    let h = Harness::new();
    let ballot = Ballot::new(guild(), uid("bot"), uid("a")).exempt(true);
    let outcome = h.moderator.cast_vote(&ballot).await;
    assert!(matches!(outcome, VoteOutcome::Rejected(Rejection::ExemptTarget)));
    assert!(h.store.get(&uid("bot")).is_none());
}

#[tokio::test]
async fn duplicate_vote_is_rejected_with_remaining_time() {
    let h = Harness::new();
    h.vote("x", "a").await;
    h.clock.set(100);

    let outcome = h.vote("x", "a").await;
    assert!(matches!(
        outcome,
        VoteOutcome::Rejected(Rejection::DuplicateVote { remaining_secs: 500 })
    ));
    assert_eq!(h.store.get(&uid("x")).unwrap().vote_count(), 1);
}

#[tokio::test]
async fn re_vote_after_expiry_is_accepted() {
    let h = Harness::new();
    h.vote("x", "a").await;
    h.clock.set(700);

    let outcome = h.vote("x", "a").await;
    assert_eq!(outcome.count(), Some(1));
    assert_eq!(
        h.store.get(&uid("x")).unwrap().votes[&uid("a")],
        Timestamp::new(1_300)
    );
}

#[tokio::test]
async fn fifth_vote_mutes_and_arms_timer() {
    let h = Harness::new();
    h.clock.set(10);
    for i in 0..4 {
        assert!(!h.vote("x", &format!("v{i}")).await.muted());
    }

    let outcome = h.vote("x", "v4").await;
    match outcome {
        VoteOutcome::Muted {
            count,
            mute_expires_at,
            ..
        } => {
            assert_eq!(count, 5);
            assert_eq!(mute_expires_at, Timestamp::new(310));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    assert_eq!(h.gateway.mute_calls(), vec![(uid("x"), true)]);
    let record = h.store.get(&uid("x")).unwrap();
    assert!(record.is_muted);
    assert_eq!(record.mute_guild, Some(guild()));
    assert_eq!(record.mute_epoch, 1);

    let timers = h.scheduler.scheduled();
    assert_eq!(timers.len(), 1);
    assert_eq!(timers[0].target, uid("x"));
    assert_eq!(timers[0].epoch, 1);
    assert_eq!(timers[0].after, Duration::from_secs(300));

    assert!(h.snapshots.saved().unwrap()[&uid("x")].is_muted);
}

#[tokio::test]
async fn votes_while_muted_are_rejected() {
    let h = Harness::new();
    h.mute_with_five_votes("x").await;
    h.clock.set(120);

    let outcome = h.vote("x", "late").await;
    assert!(matches!(
        outcome,
        VoteOutcome::Rejected(Rejection::AlreadyMuted { remaining_secs: 180 })
    ));
    assert_eq!(h.gateway.mute_calls().len(), 1);
}

#[tokio::test]
async fn concurrent_threshold_votes_mute_exactly_once() {
    let h = Harness::new();
    let mut handles = Vec::new();
    for i in 0..8 {
        let moderator = h.moderator.clone();
        handles.push(tokio::spawn(async move {
            moderator
                .cast_vote(&Ballot::new(guild(), uid("x"), uid(&format!("v{i}"))))
                .await
        }));
    }

    let mut muted = 0;
    let mut already_muted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            VoteOutcome::Muted { .. } => muted += 1,
            VoteOutcome::Rejected(Rejection::AlreadyMuted { .. }) => already_muted += 1,
            VoteOutcome::Recorded { .. } => {}
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    assert_eq!(muted, 1);
    assert_eq!(already_muted, 3);
    assert_eq!(h.gateway.mute_calls(), vec![(uid("x"), true)]);
    assert_eq!(h.scheduler.scheduled().len(), 1);
}

#[tokio::test]
async fn failed_platform_mute_keeps_vote_and_stays_unmuted() {
    let h = Harness::new();
    h.gateway.fail_mutes(true);
    for i in 0..4 {
        h.vote("x", &format!("v{i}")).await;
    }

    let outcome = h.vote("x", "v4").await;
    assert!(matches!(outcome, VoteOutcome::MuteFailed { count: 5, .. }));
    let record = h.store.get(&uid("x")).unwrap();
    assert!(!record.is_muted);
    assert_eq!(record.vote_count(), 5);
    assert!(h.scheduler.scheduled().is_empty());

    // The next vote retries the mute.
    h.gateway.fail_mutes(false);
    assert!(h.vote("x", "v5").await.muted());
}

#[tokio::test]
async fn timer_expiry_unmutes() {
    let h = Harness::new();
    h.mute_with_five_votes("x").await;
    let timer = h.scheduler.take().remove(0);
    h.clock.set(300);

    let outcome = h.moderator.expire_mute(&timer.target, timer.epoch).await;
    assert!(matches!(outcome, ExpiryOutcome::Unmuted { error: None, .. }));
    assert_eq!(
        h.gateway.mute_calls(),
        vec![(uid("x"), true), (uid("x"), false)]
    );

    let record = h.store.get(&uid("x")).unwrap();
    assert!(!record.is_muted);
    // Votes are untouched by the unmute.
    assert_eq!(record.vote_count(), 5);
    assert!(!h.snapshots.saved().unwrap()[&uid("x")].is_muted);
}

#[tokio::test]
async fn stale_timer_after_re_mute_is_ignored() {
    let h = Harness::new();
    h.mute_with_five_votes("x").await;
    let first = h.scheduler.take().remove(0);

    // Cleared and muted again before the first timer fires.
    h.moderator.clear(&uid("x"), &guild()).await;
    h.mute_with_five_votes("x").await;
    h.clock.set(300);

    let second = h.scheduler.take().remove(0);
    assert_ne!(first.epoch, second.epoch);

    let outcome = h.moderator.expire_mute(&first.target, first.epoch).await;
    assert!(matches!(outcome, ExpiryOutcome::Stale));
    assert!(h.store.get(&uid("x")).unwrap().is_muted);

    let outcome = h.moderator.expire_mute(&second.target, second.epoch).await;
    assert!(matches!(outcome, ExpiryOutcome::Unmuted { .. }));
}

#[tokio::test]
async fn epochs_continue_after_restore() {
    let mut records = Records::new();
    records.insert(
        uid("x"),
        VoteRecord {
            is_muted: true,
            mute_expiry: Timestamp::new(100),
            mute_epoch: 7,
            ..Default::default()
        },
    );
    let h = Harness::with_snapshots(NullSnapshotStore::with_records(records));
    h.moderator.restore().await;
    h.scheduler.take();

    h.clock.set(200);
    h.mute_with_five_votes("y").await;
    assert_eq!(h.scheduler.scheduled()[0].epoch, 8);
}

#[tokio::test]
async fn timer_after_clear_is_a_noop() {
    let h = Harness::new();
    h.mute_with_five_votes("x").await;
    let timer = h.scheduler.take().remove(0);
    h.moderator.clear(&uid("x"), &guild()).await;
    h.gateway.reset();

    let outcome = h.moderator.expire_mute(&timer.target, timer.epoch).await;
    assert!(matches!(outcome, ExpiryOutcome::Stale));
    assert!(h.gateway.calls().is_empty());
    assert!(h.store.get(&uid("x")).is_none());
}

#[tokio::test]
async fn presence_during_mute_reasserts_then_expires() {
    let h = Harness::new();
    h.mute_with_five_votes("x").await;
    h.gateway.reset();

    h.clock.set(100);
    let outcome = h.moderator.on_presence(&guild(), &uid("x"), Some(&voice())).await;
    assert!(matches!(outcome, PresenceOutcome::Reasserted));
    assert_eq!(h.gateway.mute_calls(), vec![(uid("x"), true)]);
    assert!(h.store.get(&uid("x")).unwrap().is_muted);

    h.clock.set(301);
    let outcome = h.moderator.on_presence(&guild(), &uid("x"), Some(&voice())).await;
    assert!(matches!(outcome, PresenceOutcome::Unmuted { error: None }));
    assert_eq!(
        h.gateway.mute_calls(),
        vec![(uid("x"), true), (uid("x"), false)]
    );
    assert!(!h.store.get(&uid("x")).unwrap().is_muted);

    h.clock.set(400);
    h.gateway.reset();
    let outcome = h.moderator.on_presence(&guild(), &uid("x"), Some(&voice())).await;
    assert!(matches!(outcome, PresenceOutcome::Ignored));
    assert!(h.gateway.mute_calls().is_empty());
}

#[tokio::test]
async fn leaving_voice_after_lapse_unmutes() {
    let h = Harness::new();
    h.mute_with_five_votes("x").await;
    h.gateway.reset();

    h.clock.set(301);
    let outcome = h.moderator.on_presence(&guild(), &uid("x"), None).await;
    assert!(matches!(outcome, PresenceOutcome::Unmuted { error: None }));
    assert_eq!(h.gateway.mute_calls(), vec![(uid("x"), false)]);
    assert!(!h.store.get(&uid("x")).unwrap().is_muted);

    h.gateway.reset();
    let outcome = h.moderator.on_presence(&guild(), &uid("x"), Some(&voice())).await;
    assert!(matches!(outcome, PresenceOutcome::Ignored));
    assert!(h.gateway.calls().is_empty());
}

#[tokio::test]
async fn presence_of_unknown_or_departing_member_is_ignored() {
    let h = Harness::new();
    let outcome = h.moderator.on_presence(&guild(), &uid("nobody"), Some(&voice())).await;
    assert!(matches!(outcome, PresenceOutcome::Ignored));

    h.mute_with_five_votes("x").await;
    h.gateway.reset();
    let outcome = h.moderator.on_presence(&guild(), &uid("x"), None).await;
    assert!(matches!(outcome, PresenceOutcome::Ignored));
    assert!(h.gateway.calls().is_empty());
}

#[tokio::test]
async fn failed_reassert_leaves_state_alone() {
    let h = Harness::new();
    h.mute_with_five_votes("x").await;
    h.gateway.fail_mutes(true);
    h.clock.set(50);

    let outcome = h.moderator.on_presence(&guild(), &uid("x"), Some(&voice())).await;
    assert!(matches!(outcome, PresenceOutcome::ReassertFailed(_)));
    assert!(h.store.get(&uid("x")).unwrap().is_muted);
}

#[tokio::test]
async fn failed_unmute_still_clears_local_state() {
    let h = Harness::new();
    h.mute_with_five_votes("x").await;
    let timer = h.scheduler.take().remove(0);
    h.gateway.fail_mutes(true);
    h.clock.set(300);

    let outcome = h.moderator.expire_mute(&timer.target, timer.epoch).await;
    assert!(matches!(outcome, ExpiryOutcome::Unmuted { error: Some(_), .. }));
    assert!(!h.store.get(&uid("x")).unwrap().is_muted);
}

#[tokio::test]
async fn clear_unmutes_and_deletes() {
    let h = Harness::new();
    h.mute_with_five_votes("x").await;

    let outcome = h.moderator.clear(&uid("x"), &guild()).await;
    assert!(matches!(
        outcome,
        ClearOutcome::Cleared {
            was_muted: true,
            unmute_error: None
        }
    ));
    assert!(h.store.get(&uid("x")).is_none());
    assert!(h.moderator.query_status(&uid("x")).await.is_none());
    assert!(!h.snapshots.saved().unwrap().contains_key(&uid("x")));
    assert_eq!(h.gateway.mute_calls().last(), Some(&(uid("x"), false)));
}

#[tokio::test]
async fn clear_of_unknown_user_reports_no_record() {
    let h = Harness::new();
    let outcome = h.moderator.clear(&uid("ghost"), &guild()).await;
    assert!(!outcome.had_record());
    assert!(h.gateway.calls().is_empty());
}

#[tokio::test]
async fn clear_of_unmuted_record_skips_platform_call() {
    let h = Harness::new();
    h.vote("x", "a").await;

    let outcome = h.moderator.clear(&uid("x"), &guild()).await;
    assert!(matches!(
        outcome,
        ClearOutcome::Cleared {
            was_muted: false,
            ..
        }
    ));
    assert!(h.gateway.mute_calls().is_empty());
}

#[tokio::test]
async fn query_status_sweeps_expired_votes_but_keeps_record() {
    let h = Harness::new();
    h.vote("x", "a").await;
    h.clock.set(300);
    h.vote("x", "b").await;
    h.clock.set(650);

    let record = h.moderator.query_status(&uid("x")).await.unwrap();
    assert_eq!(record.votes.keys().cloned().collect::<Vec<_>>(), vec![uid("b")]);

    h.clock.set(10_000);
    let record = h.moderator.query_status(&uid("x")).await.unwrap();
    assert!(record.votes.is_empty());
    assert!(h.store.get(&uid("x")).is_some());
    assert!(h.snapshots.saved().unwrap()[&uid("x")].votes.is_empty());
}

#[tokio::test]
async fn query_status_of_unknown_user_is_none() {
    let h = Harness::new();
    assert!(h.moderator.query_status(&uid("x")).await.is_none());
}

#[tokio::test]
async fn query_all_active_lists_live_and_muted_targets() {
    let h = Harness::new();
    h.vote("a", "v").await;
    h.vote("c", "v").await;
    h.mute_with_five_votes("b").await;
    h.clock.set(500);
    h.vote("d", "v").await;
    h.clock.set(650);

    let listed: Vec<UserId> = h
        .moderator
        .query_all_active()
        .await
        .into_iter()
        .map(|(target, _)| target)
        .collect();

    // `a` and `c` have only expired votes; `b` is still flagged muted.
    assert_eq!(listed, vec![uid("b"), uid("d")]);
    assert_eq!(h.store.len(), 4);
}

#[tokio::test]
async fn snapshot_failure_keeps_memory_state() {
    let h = Harness::new();
    h.snapshots.fail_saves(true);

    let outcome = h.vote("x", "a").await;
    assert!(outcome.accepted());
    assert_eq!(h.store.get(&uid("x")).unwrap().vote_count(), 1);
    assert!(h.snapshots.saved().is_none());
}

#[tokio::test]
async fn restore_loads_records_and_rearms_timers() {
    let mut records = Records::new();
    let mut muted = VoteRecord {
        is_muted: true,
        mute_expiry: Timestamp::new(1_200),
        mute_guild: Some(guild()),
        mute_epoch: 4,
        ..Default::default()
    };
    muted.votes.insert(uid("v"), Timestamp::new(1_500));
    records.insert(uid("m"), muted);
    records.insert(uid("lapsed"), VoteRecord {
        is_muted: true,
        mute_expiry: Timestamp::new(900),
        mute_epoch: 1,
        ..Default::default()
    });
    records.insert(uid("plain"), VoteRecord::new());

    let h = Harness::with_snapshots(NullSnapshotStore::with_records(records));
    h.clock.set(1_000);

    let report = h.moderator.restore().await;
    assert_eq!(report.records, 3);
    assert_eq!(report.rearmed, 2);
    assert!(report.discarded.is_none());
    assert_eq!(h.store.len(), 3);

    let mut timers = h.scheduler.scheduled();
    timers.sort_by(|a, b| a.target.cmp(&b.target));
    assert_eq!(timers[0].target, uid("lapsed"));
    assert_eq!(timers[0].after, Duration::ZERO);
    assert_eq!(timers[1].target, uid("m"));
    assert_eq!(timers[1].epoch, 4);
    assert_eq!(timers[1].after, Duration::from_secs(200));

    // A restored mute without a recorded guild is reversed using the
    // fallback guild from the presence event.
    let outcome = h
        .moderator
        .on_presence(&guild(), &uid("lapsed"), Some(&voice()))
        .await;
    assert!(matches!(outcome, PresenceOutcome::Unmuted { error: None }));
}

#[tokio::test]
async fn corrupted_snapshot_starts_empty() {
    let h = Harness::with_snapshots(NullSnapshotStore::corrupted());
    h.store.put(&uid("leftover"), VoteRecord::new());

    let report = h.moderator.restore().await;
    assert!(report.discarded.is_some());
    assert_eq!(report.records, 0);
    assert!(h.store.is_empty());
    assert!(h.scheduler.scheduled().is_empty());
}

#[tokio::test]
async fn missing_snapshot_starts_empty() {
    let h = Harness::new();
    let report = h.moderator.restore().await;
    assert_eq!(report.records, 0);
    assert!(report.discarded.is_none());
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn invalid_params_are_refused() {
    let params = ModerationParams {
        votes_needed: 0,
        ..Default::default()
    };
    let result = Moderator::new(
        params,
        Arc::new(MemoryRecordStore::default()),
        Arc::new(NullSnapshotStore::new()),
        Arc::new(NullGateway::new()),
        Arc::new(NullClock::new(0)),
        Arc::new(NullScheduler::new()),
    );
    assert!(result.is_err());
}
