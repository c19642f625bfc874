//! Unmute timers on the tokio runtime.

use std::time::Duration;

use hush_moderation::UnmuteScheduler;
use hush_types::UserId;
use tokio::sync::mpsc;

use crate::BotEvent;

/// Arms each unmute timer as a sleeping task that re-injects
/// [`BotEvent::MuteExpired`] into the bot's event channel.
///
/// Must be used from within a tokio runtime.
#[derive(Clone)]
pub struct TokioScheduler {
    events: mpsc::Sender<BotEvent>,
}

impl TokioScheduler {
    pub fn new(events: mpsc::Sender<BotEvent>) -> Self {
        Self { events }
    }
}

impl UnmuteScheduler for TokioScheduler {
    fn schedule_unmute(&self, target: &UserId, epoch: u64, after: Duration) {
        let events = self.events.clone();
        let target = target.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if events
                .send(BotEvent::MuteExpired { target, epoch })
                .await
                .is_err()
            {
                tracing::debug!(epoch, "event loop gone, unmute timer dropped");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let (tx, mut rx) = mpsc::channel(4);
        let scheduler = TokioScheduler::new(tx);
        scheduler.schedule_unmute(&UserId::new("x"), 3, Duration::from_secs(300));

        tokio::time::sleep(Duration::from_secs(299)).await;
        assert!(rx.try_recv().is_err());

        match rx.recv().await {
            Some(BotEvent::MuteExpired { target, epoch }) => {
                assert_eq!(target, UserId::new("x"));
                assert_eq!(epoch, 3);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
