//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether the in-memory cache is partitioned per tenant
    pub tenant_based: bool,
    /// Tenant identities, one store each
    pub tenant_ids: Vec<String>,
    /// Fraction (0-1) of system memory granted to the cache
    pub memory_usage_percentage: f64,
    /// Explicit total cache budget in bytes, overriding the memory fraction
    pub cache_memory_bytes: Option<usize>,
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Expiry sweep interval in seconds
    pub sweep_interval: u64,
    /// Capacity rebalance interval in seconds
    pub rebalance_interval: u64,
    /// Redis connection URL; the redis system is disabled when unset
    pub redis_url: Option<String>,
    /// Memcached URL; the memcache system is disabled when unset
    pub memcache_url: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `TENANT_BASED` - Partition the cache per tenant (default: true)
    /// - `TENANT_IDS` - Comma separated tenant ids (default: tenant1,tenant2)
    /// - `MEMORY_USAGE_PERCENTAGE` - Fraction of system memory (default: 0.1)
    /// - `CACHE_MEMORY_BYTES` - Total budget in bytes (default: derived)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `SWEEP_INTERVAL` - Expiry sweep frequency in seconds (default: 5)
    /// - `REBALANCE_INTERVAL` - Rebalance frequency in seconds (default: 1)
    /// - `REDIS_URL` - Redis URL (default: unset)
    /// - `MEMCACHE_URL` - Memcached URL, e.g. `memcache://127.0.0.1:11211` (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tenant_based: parse_var::<bool>("TENANT_BASED").unwrap_or(defaults.tenant_based),
            tenant_ids: env::var("TENANT_IDS")
                .ok()
                .map(|v| parse_tenant_ids(&v))
                .filter(|ids| !ids.is_empty())
                .unwrap_or(defaults.tenant_ids),
            memory_usage_percentage: parse_var::<f64>("MEMORY_USAGE_PERCENTAGE")
                .filter(|p| (0.0..=1.0).contains(p))
                .unwrap_or(defaults.memory_usage_percentage),
            cache_memory_bytes: parse_var::<usize>("CACHE_MEMORY_BYTES"),
            default_ttl: parse_var::<u64>("DEFAULT_TTL")
                .filter(|ttl| *ttl > 0)
                .unwrap_or(defaults.default_ttl),
            server_port: parse_var::<u16>("SERVER_PORT").unwrap_or(defaults.server_port),
            sweep_interval: parse_var::<u64>("SWEEP_INTERVAL")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.sweep_interval),
            rebalance_interval: parse_var::<u64>("REBALANCE_INTERVAL")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.rebalance_interval),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            memcache_url: env::var("MEMCACHE_URL").ok().filter(|url| !url.is_empty()),
        }
    }

    /// Returns the total cache budget: the explicit byte budget when set,
    /// otherwise `system_memory * memory_usage_percentage`.
    pub fn total_budget(&self, system_memory: u64) -> usize {
        self.cache_memory_bytes
            .unwrap_or((system_memory as f64 * self.memory_usage_percentage) as usize)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tenant_based: true,
            tenant_ids: vec!["tenant1".to_string(), "tenant2".to_string()],
            memory_usage_percentage: 0.1,
            cache_memory_bytes: None,
            default_ttl: 300,
            server_port: 8080,
            sweep_interval: 5,
            rebalance_interval: 1,
            redis_url: None,
            memcache_url: None,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_tenant_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.tenant_based);
        assert_eq!(config.tenant_ids, vec!["tenant1", "tenant2"]);
        assert_eq!(config.default_ttl, 300);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.sweep_interval, 5);
        assert_eq!(config.rebalance_interval, 1);
        assert!(config.redis_url.is_none());
        assert!(config.memcache_url.is_none());
    }

    #[test]
    fn test_parse_tenant_ids() {
        assert_eq!(parse_tenant_ids("tenant1, tenant2,,tenant3 "), vec!["tenant1", "tenant2", "tenant3"]);
        assert!(parse_tenant_ids(" , ").is_empty());
    }

    #[test]
    fn test_total_budget() {
        let mut config = Config {
            memory_usage_percentage: 0.25,
            ..Config::default()
        };
        assert_eq!(config.total_budget(4_000), 1_000);

        config.cache_memory_bytes = Some(900);
        assert_eq!(config.total_budget(4_000), 900);
    }
}
