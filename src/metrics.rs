//! Prometheus Metrics
//!
//! Request and cache operation counters, kept in a registry owned by the
//! server and exposed on `GET /metrics` in the text exposition format.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::error::{CacheError, Result};

/// HTTP request latency buckets (seconds)
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.0005, 0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5,
];

/// Container for all cache server metrics.
#[derive(Clone)]
pub struct CacheMetrics {
    registry: Registry,

    /// HTTP request counter - labels: method, path, status
    http_requests_total: IntCounterVec,

    /// HTTP request duration histogram - labels: method, path
    http_request_duration_seconds: HistogramVec,

    /// Cache operation counter - labels: operation, outcome, system
    cache_operations_total: IntCounterVec,
}

impl CacheMetrics {
    /// Creates the metrics and registers them in a fresh registry.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )?;
        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(HTTP_LATENCY_BUCKETS.to_vec()),
            &["method", "path"],
        )?;
        let cache_operations_total = IntCounterVec::new(
            Opts::new("cache_operations_total", "Total number of cache operations"),
            &["operation", "outcome", "system"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(cache_operations_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            cache_operations_total,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, status.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record the outcome of a cache operation on `system`.
    pub fn record_cache_operation<T>(&self, system: &str, operation: &str, result: &Result<T>) {
        let outcome = match result {
            Ok(_) => "ok",
            Err(CacheError::NotFound(_)) => "not_found",
            Err(_) => "error",
        };
        self.cache_operations_total
            .with_label_values(&[operation, outcome, system])
            .inc();
    }

    /// Renders every registered metric in the text exposition format.
    pub fn render(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
