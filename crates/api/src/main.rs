//! GameDex API server binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use gamedex_cache::TagCache;
use gamedex_common::config::AppConfig;
use gamedex_common::db::create_pool;

use gamedex_api::routes::create_router;
use gamedex_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("gamedex_api=debug,gamedex_catalog=debug,tower_http=debug")
        }))
        .init();

    tracing::info!("Starting GameDex API server...");

    // Load configuration
    let config = AppConfig::from_env()?;

    // Create database connection pool
    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    tracing::info!("Database pool created");

    // Build the read cache
    let ttl = match config.cache_ttl_seconds {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let cache = Arc::new(TagCache::new(ttl));

    // Build application state
    let state = AppState::new(pool, cache, config);

    // Build router
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
