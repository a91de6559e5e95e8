//! Change-signal bridge — forwards collaborator watch signals into the
//! TUI action loop.
//!
//! Runs as a background task: subscribes to the log's and the
//! enrichment caches' version channels and forwards every change as an
//! [`Action`]. The engine itself is only ever touched from the event
//! loop; this task just tells the loop that something moved.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use connwatch_core::{AppInfoCache, HostInfoCache, MemoryConnLog};

use crate::action::Action;

/// Spawn the forwarder connecting collaborator change signals to the
/// action channel. Shuts down cleanly on cancellation.
pub fn spawn_change_forwarder(
    log: Arc<MemoryConnLog>,
    apps: Arc<AppInfoCache>,
    hosts: Arc<HostInfoCache>,
    action_tx: UnboundedSender<Action>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut log_rx = log.subscribe();
        let mut apps_rx = apps.subscribe();
        let mut hosts_rx = hosts.subscribe();

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => break,

                Ok(()) = log_rx.changed() => {
                    if action_tx.send(Action::LogChanged).is_err() {
                        break;
                    }
                }
                Ok(()) = apps_rx.changed() => {
                    if action_tx.send(Action::CacheChanged).is_err() {
                        break;
                    }
                }
                Ok(()) = hosts_rx.changed() => {
                    if action_tx.send(Action::CacheChanged).is_err() {
                        break;
                    }
                }
            }
        }

        debug!("change forwarder shut down");
    })
}
