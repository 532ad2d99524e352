//! Tenant Cache - a multi-tenant key/value cache server
//!
//! Byte-bounded LRU stores with per-entry TTL, one per tenant, behind an
//! HTTP API that can also route requests to remote Redis or memcached
//! backends.

pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod tasks;
pub mod tenant;

pub use api::AppState;
pub use backend::{CacheBackend, CacheSystem};
pub use config::Config;
pub use metrics::CacheMetrics;
pub use tasks::spawn_background_tasks;
pub use tenant::{TenantCaches, DEFAULT_TENANT};
