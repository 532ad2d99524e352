//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint. Every cache route
//! resolves its backend from the `system` query parameter and, for the
//! in-memory system, the tenant store from `tenantID`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error};

use crate::backend::{CacheBackend, CacheSystem};
use crate::cache::SharedStore;
use crate::error::{CacheError, Result};
use crate::metrics::CacheMetrics;
use crate::models::{
    CacheQuery, ClearResponse, DeleteResponse, EntryResponse, GetResponse, HealthResponse,
    SetRequest, SetResponse, StatsResponse,
};
use crate::tenant::{TenantCaches, DEFAULT_TENANT};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Partitioned in-memory stores
    pub tenants: Arc<TenantCaches>,
    /// Request and cache operation counters
    pub metrics: Arc<CacheMetrics>,
    /// Remote backends that connected at startup
    remotes: Arc<HashMap<CacheSystem, Arc<dyn CacheBackend>>>,
}

impl AppState {
    /// Creates state serving only the in-memory system.
    pub fn new(tenants: Arc<TenantCaches>, metrics: Arc<CacheMetrics>) -> Self {
        Self {
            tenants,
            metrics,
            remotes: Arc::new(HashMap::new()),
        }
    }

    /// Registers a remote backend under `system`.
    pub fn with_remote(mut self, system: CacheSystem, backend: Arc<dyn CacheBackend>) -> Self {
        Arc::make_mut(&mut self.remotes).insert(system, backend);
        self
    }

    /// Resolves the backend a request addresses.
    pub fn backend(&self, query: &CacheQuery) -> Result<Arc<dyn CacheBackend>> {
        match parse_system(query)? {
            CacheSystem::InMemory => Ok(Arc::new(self.tenant_store(query)?.clone())),
            system => self
                .remotes
                .get(&system)
                .cloned()
                .ok_or_else(|| CacheError::InvalidSystem(format!("{} is not configured", system))),
        }
    }

    /// Resolves the in-memory store of the requesting tenant.
    ///
    /// With tenancy disabled every request lands on the default tenant.
    pub fn tenant_store(&self, query: &CacheQuery) -> Result<&SharedStore> {
        if !self.tenants.is_tenant_based() {
            return self
                .tenants
                .get_store(DEFAULT_TENANT)
                .ok_or_else(|| CacheError::InvalidTenant(DEFAULT_TENANT.to_string()));
        }

        let tenant = query
            .tenant_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CacheError::InvalidTenant("missing tenantID".to_string()))?;
        self.tenants
            .get_store(tenant)
            .ok_or_else(|| CacheError::InvalidTenant(tenant.to_string()))
    }
}

fn parse_system(query: &CacheQuery) -> Result<CacheSystem> {
    query
        .system
        .as_deref()
        .ok_or_else(|| CacheError::InvalidSystem("missing system".to_string()))?
        .parse()
}

/// Key that collides with the static `/cache/clear` route
pub const CLEAR_KEY: &str = "clear";

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<CacheQuery>,
) -> Result<Json<GetResponse>> {
    let backend = state.backend(&query)?;
    let result = backend.get(&key).await;
    state.metrics.record_cache_operation(backend.name(), "get", &result);
    let value = result?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for GET /cache/clear, reading the key named `clear`
pub async fn get_clear_key_handler(
    state: State<AppState>,
    query: Query<CacheQuery>,
) -> Result<Json<GetResponse>> {
    get_handler(state, Path(CLEAR_KEY.to_string()), query).await
}

/// Handler for POST /cache
///
/// Body rejections (bad syntax, wrong field types, missing fields) are
/// reported as 400 rather than axum's default 422.
pub async fn set_handler(
    State(state): State<AppState>,
    Query(query): Query<CacheQuery>,
    body: std::result::Result<Json<SetRequest>, JsonRejection>,
) -> Result<Json<SetResponse>> {
    let Json(req) = body.map_err(|rejection| CacheError::InvalidRequest(rejection.body_text()))?;
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let backend = state.backend(&query)?;
    let ttl = req.ttl();
    debug!("SET {} on {} (ttl {:?})", req.key, backend.name(), ttl);
    let result = backend.set(req.key.clone(), req.value, ttl).await;
    state.metrics.record_cache_operation(backend.name(), "set", &result);
    result?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<CacheQuery>,
) -> Result<Json<DeleteResponse>> {
    let backend = state.backend(&query)?;
    let result = backend.delete(&key).await;
    state.metrics.record_cache_operation(backend.name(), "delete", &result);
    result?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /cache/clear, deleting the key named `clear`
pub async fn delete_clear_key_handler(
    state: State<AppState>,
    query: Query<CacheQuery>,
) -> Result<Json<DeleteResponse>> {
    delete_handler(state, Path(CLEAR_KEY.to_string()), query).await
}

/// Handler for PUT /cache/clear
pub async fn clear_handler(
    State(state): State<AppState>,
    Query(query): Query<CacheQuery>,
) -> Result<Json<ClearResponse>> {
    let backend = state.backend(&query)?;
    let result = backend.clear().await;
    state.metrics.record_cache_operation(backend.name(), "clear", &result);
    result?;

    Ok(Json(ClearResponse::new(backend.name())))
}

/// Handler for GET /cache
///
/// Snapshot of the tenant's live entries, most recently used first. Only the
/// in-memory system keeps an enumerable store.
pub async fn get_all_handler(
    State(state): State<AppState>,
    Query(query): Query<CacheQuery>,
) -> Result<Json<Vec<EntryResponse>>> {
    let system = parse_system(&query)?;
    if system != CacheSystem::InMemory {
        return Err(CacheError::InvalidRequest(format!(
            "{} does not support listing entries",
            system
        )));
    }

    let entries = state.tenant_store(&query)?.get_all().await;
    Ok(Json(entries.into_iter().map(EntryResponse::from).collect()))
}

/// Handler for GET /stats
pub async fn stats_handler(
    State(state): State<AppState>,
    Query(query): Query<CacheQuery>,
) -> Result<Json<StatsResponse>> {
    let store = state.tenant_store(&query)?;
    Ok(Json(StatsResponse::from(store.stats().await)))
}

/// Handler for GET /metrics
///
/// Returns Prometheus text format metrics.
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {e}"),
            )
                .into_response()
        }
    }
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
