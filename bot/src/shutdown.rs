//! Stopping the bot.
//!
//! The event loop and the gateway session each hold a broadcast receiver.
//! Whoever stops the bot first (an OS signal, a dead gateway session, a
//! test) fires it once, and the first reason is kept for the exit log.

use std::sync::{Arc, OnceLock};

use tokio::signal;
use tokio::sync::broadcast;

/// Why the bot is stopping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / Ctrl-C.
    Interrupt,
    /// SIGTERM.
    Terminate,
    /// The gateway session ended on its own.
    GatewayClosed,
    /// Stopped from code.
    Requested,
}

/// Shared stop switch for the event loop and the gateway session.
#[derive(Clone)]
pub struct ShutdownController {
    tx: broadcast::Sender<()>,
    reason: Arc<OnceLock<ShutdownReason>>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            reason: Arc::new(OnceLock::new()),
        }
    }

    /// Receiver for [`HushBot::run`](crate::HushBot::run) or the gateway
    /// session. Subscribe before spawning the task that uses it; a receiver
    /// created after the trigger never fires.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn shutdown(&self) {
        self.trigger(ShutdownReason::Requested);
    }

    /// Fires every receiver. Only the first reason is remembered.
    pub fn trigger(&self, reason: ShutdownReason) {
        if self.reason.set(reason).is_ok() {
            tracing::info!(?reason, "shutting down");
        }
        let _ = self.tx.send(());
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        self.reason.get().copied()
    }

    /// Waits for SIGINT or SIGTERM and triggers with the matching reason.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "SIGTERM handler unavailable, only Ctrl-C stops the bot");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        let reason = tokio::select! {
            _ = ctrl_c => ShutdownReason::Interrupt,
            _ = terminate => ShutdownReason::Terminate,
        };
        self.trigger(reason);
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}
