//! Nullable infrastructure for deterministic testing.
//!
//! Every outside dependency of the moderation core (wall clock, chat
//! platform, timers, snapshot file) sits behind a trait. The types here
//! implement those traits so that they:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Record what was asked of them for later assertions
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod gateway;
pub mod scheduler;
pub mod snapshot;

pub use clock::NullClock;
pub use gateway::{GatewayCall, NullGateway};
pub use scheduler::{NullScheduler, ScheduledUnmute};
pub use snapshot::NullSnapshotStore;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks `mutex`, recovering the data if a panicking test poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
