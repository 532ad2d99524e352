//! Capacity Rebalancer Task
//!
//! Background task that recomputes the memory budget from system memory and
//! grows tenant capacities when the budget rises above the configured one.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::tenant::{MemoryProbe, TenantCaches};

/// Spawns the rebalancer for `tenants`.
///
/// Every `interval` it reads total memory from `probe` and calls
/// [`TenantCaches::rebalance`] with `usage_fraction`. Capacities are never
/// lowered. The task exits when `token` is cancelled.
pub fn spawn_rebalancer_task<P>(
    tenants: Arc<TenantCaches>,
    mut probe: P,
    usage_fraction: f64,
    interval: Duration,
    token: CancellationToken,
) -> JoinHandle<()>
where
    P: MemoryProbe + 'static,
{
    tokio::spawn(async move {
        info!(
            "Starting capacity rebalancer for {} tenants with interval of {:?}",
            tenants.tenant_count(),
            interval
        );

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            let system_memory = probe.total_memory();
            if let Some(share) = tenants.rebalance(system_memory, usage_fraction).await {
                debug!("Rebalanced tenant share to {} bytes", share);
            }
        }

        debug!("Capacity rebalancer stopped");
    })
}
