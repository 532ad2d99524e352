//! Tenant Module
//!
//! Partitions the in-memory cache into one store per tenant and sizes those
//! stores from the process memory budget.

mod manager;
mod memory;

pub use manager::{TenantCaches, DEFAULT_TENANT};
pub use memory::{MemoryProbe, SystemMemory};
