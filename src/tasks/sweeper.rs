//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired entries from a store,
//! whether or not they are ever read again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::SharedStore;

/// Spawns a background task that purges expired entries from `store`.
///
/// The task sleeps for `interval` between sweeps and takes the store's lock
/// for the duration of each sweep. It exits when `token` is cancelled.
///
/// # Arguments
/// * `tenant` - Tenant owning the store, for logs
/// * `store` - Shared handle to the store to sweep
/// * `interval` - Time between sweeps
/// * `token` - Cancellation token that stops the task
///
/// # Returns
/// A JoinHandle for the spawned task.
///
/// # Example
/// ```ignore
/// let token = CancellationToken::new();
/// let handle = spawn_sweeper_task("tenant1".into(), store, Duration::from_secs(5), token.clone());
/// // Later, during shutdown:
/// token.cancel();
/// handle.await?;
/// ```
pub fn spawn_sweeper_task(
    tenant: String,
    store: SharedStore,
    interval: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting expiry sweeper for tenant {} with interval of {:?}",
            tenant, interval
        );

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            let removed = store.purge_expired().await;
            if removed > 0 {
                info!("Expiry sweep for tenant {}: removed {} expired entries", tenant, removed);
            } else {
                debug!("Expiry sweep for tenant {}: no expired entries found", tenant);
            }
        }

        debug!("Expiry sweeper for tenant {} stopped", tenant);
    })
}
