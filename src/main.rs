//! Tenant Cache - a multi-tenant key/value cache server
//!
//! Byte-bounded LRU stores with TTL expiry, partitioned per tenant.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tenant_cache::api::{create_router, AppState};
use tenant_cache::backend::{CacheSystem, MemcacheBackend, RedisBackend};
use tenant_cache::tenant::{MemoryProbe, SystemMemory};
use tenant_cache::{spawn_background_tasks, CacheMetrics, Config, TenantCaches};

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Size the budget and create the tenant stores
/// 4. Connect the optional Redis and memcached backends
/// 5. Start the sweeper and rebalancer tasks
/// 6. Serve HTTP until SIGINT/SIGTERM, then stop the tasks
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tenant_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tenant Cache Server");

    let config = Config::from_env();
    let system_memory = SystemMemory::new().total_memory();
    let total_budget = config.total_budget(system_memory);
    info!(
        "Configuration loaded: tenant_based={}, budget={} bytes of {} system, default_ttl={}s, port={}",
        config.tenant_based, total_budget, system_memory, config.default_ttl, config.server_port
    );

    let tenants = Arc::new(TenantCaches::from_config(&config, total_budget));
    let metrics = CacheMetrics::new().context("failed to register metrics")?;
    let mut state = AppState::new(Arc::clone(&tenants), Arc::new(metrics));
    let default_ttl = Duration::from_secs(config.default_ttl);

    if let Some(url) = &config.redis_url {
        match RedisBackend::connect(url, default_ttl).await {
            Ok(redis) => state = state.with_remote(CacheSystem::Redis, Arc::new(redis)),
            Err(e) => warn!("Redis unavailable, system disabled: {}", e),
        }
    }

    if let Some(url) = &config.memcache_url {
        match MemcacheBackend::connect(url, default_ttl).await {
            Ok(memcache) => state = state.with_remote(CacheSystem::Memcache, Arc::new(memcache)),
            Err(e) => warn!("Memcache unavailable, system disabled: {}", e),
        }
    }

    let token = CancellationToken::new();
    let handles = spawn_background_tasks(&tenants, &config, token.clone());
    info!("Started {} background tasks", handles.len());

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    stop_tasks(token, handles).await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}

async fn stop_tasks(token: CancellationToken, handles: Vec<JoinHandle<()>>) {
    token.cancel();
    for handle in handles {
        if let Err(e) = handle.await {
            warn!("Background task ended abnormally: {}", e);
        }
    }
}
