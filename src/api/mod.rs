//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `GET /cache/:key` - Retrieve a value by key
//! - `POST /cache` - Store a key-value pair
//! - `DELETE /cache/:key` - Delete a key
//! - `PUT /cache/clear` - Empty the addressed cache (GET/DELETE address the key `clear`)
//! - `GET /cache` - List live in-memory entries
//! - `GET /stats` - Get in-memory store statistics
//! - `GET /metrics` - Prometheus metrics
//! - `GET /health` - Health check endpoint
//!
//! Cache routes take `?system=<inmemory|redis|memcache>&tenantID=<id>`.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
