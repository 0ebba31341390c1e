//! Periodic blacklist garbage collection.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::SessionManager;

/// Spawns a task that sweeps expired blacklist entries every `every`.
///
/// The first sweep runs immediately. The task runs until aborted.
pub fn spawn_blacklist_sweeper(manager: Arc<SessionManager>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match manager.sweep_blacklist().await {
                Ok(0) => tracing::debug!("blacklist sweep: nothing expired"),
                Ok(removed) => tracing::info!(removed, "blacklist sweep completed"),
                Err(e) => tracing::error!(error = %e, "blacklist sweep failed"),
            }
        }
    })
}
