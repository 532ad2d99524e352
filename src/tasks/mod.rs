//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: removes expired entries from one store at a fixed interval
//! - Capacity rebalance: grows tenant capacities when system memory allows
//!
//! Every task exits when its cancellation token is cancelled.

mod rebalancer;
mod sweeper;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::tenant::{SystemMemory, TenantCaches};

pub use rebalancer::spawn_rebalancer_task;
pub use sweeper::spawn_sweeper_task;

/// Spawns one sweeper per tenant store and one rebalancer for the partitions.
pub fn spawn_background_tasks(
    tenants: &Arc<TenantCaches>,
    config: &Config,
    token: CancellationToken,
) -> Vec<JoinHandle<()>> {
    let sweep_interval = Duration::from_secs(config.sweep_interval);

    let mut handles: Vec<JoinHandle<()>> = tenants
        .stores()
        .map(|(tenant, store)| {
            spawn_sweeper_task(
                tenant.to_string(),
                store.clone(),
                sweep_interval,
                token.child_token(),
            )
        })
        .collect();

    handles.push(spawn_rebalancer_task(
        Arc::clone(tenants),
        SystemMemory::new(),
        config.memory_usage_percentage,
        Duration::from_secs(config.rebalance_interval),
        token.child_token(),
    ));
    handles
}
