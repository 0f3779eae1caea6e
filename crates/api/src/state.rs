//! Shared application state for the Axum API server.

use std::sync::Arc;

use gamedex_cache::TagCache;
use gamedex_common::config::AppConfig;
use sqlx::PgPool;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub cache: Arc<TagCache>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(pool: PgPool, cache: Arc<TagCache>, config: AppConfig) -> Self {
        Self {
            pool,
            cache,
            config,
        }
    }
}
