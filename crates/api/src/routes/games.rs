//! Game routes: cached paginated listing plus CRUD with tag invalidation.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use gamedex_cache::{page_key, tags};
use gamedex_catalog::games::{CreateGameParams, GameStore, UpdateGameParams};
use gamedex_common::error::AppError;
use gamedex_common::types::Game;

use crate::routes::ListQuery;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/videogame", get(list_games).post(create_game))
        .route(
            "/videogame/{id}",
            get(get_game).put(update_game).delete(delete_game),
        )
}

/// GET /videogame — one cached page of the catalog.
///
/// The page is computed at most once per distinct (page, limit) between
/// invalidations; concurrent readers of a missing page share one repository
/// query.
async fn list_games(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let params = query.clamp();
    let key = page_key(tags::VIDEOGAME, params);

    let pool = state.pool.clone();
    let page = state
        .cache
        .get_or_compute(&key, &[tags::VIDEOGAME], move || async move {
            let games = GameStore::list_page(&pool, params.page, params.limit).await?;
            Ok(serde_json::to_value(games)?)
        })
        .await?;

    Ok(Json(page))
}

/// GET /videogame/:id — single game, uncached.
async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Game>, AppError> {
    let game = GameStore::get(&state.pool, id).await?;
    Ok(Json(game))
}

/// POST /videogame — create a game and purge every cached game page.
async fn create_game(
    State(state): State<AppState>,
    Json(params): Json<CreateGameParams>,
) -> Result<(StatusCode, Json<Game>), AppError> {
    let game = GameStore::create(&state.pool, &params).await?;
    state.cache.invalidate_tag(tags::VIDEOGAME);
    Ok((StatusCode::CREATED, Json(game)))
}

/// PUT /videogame/:id — update a game and purge every cached game page.
async fn update_game(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(params): Json<UpdateGameParams>,
) -> Result<Json<Game>, AppError> {
    let game = GameStore::update(&state.pool, id, &params).await?;
    state.cache.invalidate_tag(tags::VIDEOGAME);
    Ok(Json(game))
}

/// DELETE /videogame/:id — delete a game and purge every cached game page.
async fn delete_game(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = GameStore::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Game {} not found", id)));
    }
    state.cache.invalidate_tag(tags::VIDEOGAME);
    Ok(StatusCode::NO_CONTENT)
}
