//! Tenant partition manager.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::SharedStore;
use crate::config::Config;

/// Identity of the single store used when tenancy is disabled.
pub const DEFAULT_TENANT: &str = "defaultTenant";

// == Tenant Caches ==
/// One [`SharedStore`] per tenant, fixed at construction.
///
/// Stores are disjoint: the same key written under two tenants lives in two
/// unrelated stores.
#[derive(Debug)]
pub struct TenantCaches {
    stores: HashMap<String, SharedStore>,
    tenant_based: bool,
    total_budget: usize,
}

impl TenantCaches {
    /// Creates the partitions.
    ///
    /// With tenancy enabled every distinct id gets `total_budget / tenants`
    /// bytes. With tenancy disabled, or with no ids configured, a single
    /// [`DEFAULT_TENANT`] store gets the whole budget.
    pub fn new(
        tenant_based: bool,
        tenant_ids: &[String],
        total_budget: usize,
        default_ttl: Duration,
    ) -> Self {
        let mut stores = HashMap::new();

        if tenant_based && !tenant_ids.is_empty() {
            let mut ids: Vec<&String> = tenant_ids.iter().collect();
            ids.sort();
            ids.dedup();

            let share = total_budget / ids.len();
            info!("Tenant IDs: {:?}, {} bytes each", ids, share);
            for id in ids {
                stores.insert(id.clone(), SharedStore::new(share, default_ttl));
            }
        } else {
            if tenant_based {
                warn!("Tenancy enabled without tenant ids, using the default tenant");
            }
            stores.insert(
                DEFAULT_TENANT.to_string(),
                SharedStore::new(total_budget, default_ttl),
            );
        }

        Self {
            stores,
            tenant_based: tenant_based && !tenant_ids.is_empty(),
            total_budget,
        }
    }

    /// Creates the partitions described by `config` over `total_budget` bytes.
    pub fn from_config(config: &Config, total_budget: usize) -> Self {
        Self::new(
            config.tenant_based,
            &config.tenant_ids,
            total_budget,
            Duration::from_secs(config.default_ttl),
        )
    }

    /// Returns the store of a known tenant, `None` otherwise.
    pub fn get_store(&self, tenant_id: &str) -> Option<&SharedStore> {
        self.stores.get(tenant_id)
    }

    /// Iterates over `(tenant, store)` pairs in no particular order.
    pub fn stores(&self) -> impl Iterator<Item = (&str, &SharedStore)> {
        self.stores.iter().map(|(id, store)| (id.as_str(), store))
    }

    /// Sorted tenant identities.
    pub fn tenant_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.stores.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn tenant_count(&self) -> usize {
        self.stores.len()
    }

    pub fn is_tenant_based(&self) -> bool {
        self.tenant_based
    }

    // == Rebalance ==
    /// Recomputes the budget as `system_memory * usage_fraction` and, if it
    /// exceeds the configured budget, grows every store to an even share.
    ///
    /// Capacities only grow; a smaller share leaves every store untouched.
    /// Returns the per-tenant share when a grow pass ran.
    pub async fn rebalance(&self, system_memory: u64, usage_fraction: f64) -> Option<usize> {
        let recomputed = (system_memory as f64 * usage_fraction) as usize;
        if recomputed <= self.total_budget {
            debug!(
                recomputed,
                configured = self.total_budget,
                "Memory budget not above configured budget"
            );
            return None;
        }

        let share = recomputed / self.stores.len().max(1);
        for (tenant, store) in &self.stores {
            if store.grow_capacity(share).await {
                info!("Increased capacity for tenant {} to {} bytes", tenant, share);
            }
        }
        Some(share)
    }
}
