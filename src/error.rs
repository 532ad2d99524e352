//! Error types for the cache server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache server.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key absent, or lapsed at read/delete time
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Unknown or missing tenant identity
    #[error("Tenant not found: {0}")]
    InvalidTenant(String),

    /// Unknown, missing or disabled cache system selector
    #[error("Cache system not found: {0}")]
    InvalidSystem(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Remote backend failure
    #[error("Backend error: {0}")]
    Backend(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidTenant(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidSystem(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Backend(_) => StatusCode::BAD_GATEWAY,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, CacheError>;
