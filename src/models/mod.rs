//! Request and Response models for the cache server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request bodies, query strings and
//! response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{CacheQuery, SetRequest};
pub use responses::{
    ClearResponse, DeleteResponse, EntryResponse, ErrorResponse, GetResponse, HealthResponse,
    SetResponse, StatsResponse,
};
