//! Background Expiration Sweeper
//!
//! Lazy on-access pruning only reclaims keys that some command still
//! touches; a key that expires and is never mentioned again would sit in
//! memory forever. The sweeper closes that gap: a single background task
//! wakes on a fixed cadence, asks the expiration index for every entry
//! whose deadline has passed, and deletes those keys.
//!
//! The sweep is split in two steps so the index lock is never held across
//! the deletions: collect the due entries under a read view, release it,
//! then call back into the store key by key. A key that was deleted or
//! renewed in between is skipped silently.

use crate::storage::Store;
use std::sync::Weak;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, trace};

/// Fixed interval between sweeps. Not configurable from the command
/// surface.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to the running sweeper task.
///
/// Dropping the handle stops the task; the shutdown signal is observed
/// within one tick.
#[derive(Debug)]
pub struct Sweeper {
    shutdown_tx: watch::Sender<bool>,
}

impl Sweeper {
    /// Starts a sweeper bound to `store`.
    ///
    /// The handle is weak on purpose: the store owns the sweeper, not the
    /// other way around, and the task exits on its own once the store is
    /// gone.
    pub fn start(store: Weak<Store>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(sweeper_loop(store, shutdown_rx));
        debug!("expiration sweeper started");
        Self { shutdown_tx }
    }

    /// Signals the sweeper task to stop. Called automatically on drop.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
        debug!("expiration sweeper stopped");
    }
}

/// The main sweeper loop: sleep one tick or wake early on shutdown, then
/// delete everything that is due.
async fn sweeper_loop(store: Weak<Store>, mut shutdown_rx: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(SWEEP_INTERVAL) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    trace!("sweeper received shutdown signal");
                    return;
                }
            }
        }

        let Some(store) = store.upgrade() else {
            trace!("store dropped, sweeper exiting");
            return;
        };

        let removed = store.sweep_expired();
        if removed > 0 {
            debug!(removed, keys_remaining = store.len(), "swept expired keys");
        }
    }
}
