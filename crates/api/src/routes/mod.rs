pub mod categories;
pub mod editors;
pub mod games;
pub mod health;

use axum::Router;
use serde::Deserialize;

use gamedex_cache::PageParams;

use crate::state::AppState;

/// Build the complete API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(games::router())
        .merge(editors::router())
        .merge(categories::router())
        .with_state(state)
}

/// Raw pagination query parameters.
///
/// Captured as strings so malformed input (`page=abc`, `limit=-2`) clamps
/// to valid bounds instead of failing extraction with a 400.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListQuery {
    pub fn clamp(&self) -> PageParams {
        PageParams::from_raw(self.page.as_deref(), self.limit.as_deref())
    }
}
