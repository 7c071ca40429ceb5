//! Periodic business-unit registry reload.
//!
//! Keeps the authorization snapshot in step with the source table without
//! any per-record mutation: every tick replaces the snapshot wholesale. A
//! failed reload keeps the previous snapshot and retries on the next
//! tick.

use crate::authz::BusinessUnitRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Spawn the registry reload loop.
///
/// The loop runs until the shutdown token is cancelled. The interval's
/// immediate first tick is consumed up front - the caller performs the
/// initial load itself.
pub fn spawn_registry_reload(
    registry: Arc<BusinessUnitRegistry>,
    interval_seconds: u64,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; the startup load already
        // happened in main.
        ticker.tick().await;

        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    tracing::info!(target: "bff.tasks.registry_reload", "Registry reload task shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = registry.reload().await {
                        tracing::error!(
                            target: "bff.tasks.registry_reload",
                            error = %e,
                            "Scheduled registry reload failed, keeping previous snapshot"
                        );
                    }
                }
            }
        }
    })
}
