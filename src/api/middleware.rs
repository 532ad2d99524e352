//! HTTP metrics middleware.

use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use tokio::time::Instant;

use crate::metrics::CacheMetrics;

/// Counts and times every routed request by method, route and status.
///
/// Installed as a route layer so the route template is known and keys do
/// not become label values.
pub async fn track_http_metrics(
    State(metrics): State<Arc<CacheMetrics>>,
    matched_path: Option<MatchedPath>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = matched_path
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;

    metrics.record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}
