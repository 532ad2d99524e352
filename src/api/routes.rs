//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, delete_clear_key_handler, delete_handler, get_all_handler,
    get_clear_key_handler, get_handler, health_handler, metrics_handler, set_handler,
    stats_handler, AppState,
};
use super::middleware::track_http_metrics;

/// Creates the main router with all endpoints configured.
///
/// `/cache/clear` is a static route and takes precedence over `/cache/:key`,
/// so it also serves GET and DELETE for the key named `clear`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/cache", post(set_handler).get(get_all_handler))
        .route(
            "/cache/clear",
            put(clear_handler)
                .get(get_clear_key_handler)
                .delete(delete_clear_key_handler),
        )
        .route("/cache/:key", get(get_handler).delete(delete_handler))
        .route("/stats", get(stats_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route_layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            track_http_metrics,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
