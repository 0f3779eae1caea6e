//! Editor routes: cached paginated listing plus CRUD with tag invalidation.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use gamedex_cache::{page_key, tags};
use gamedex_catalog::editors::{CreateEditorParams, EditorStore, UpdateEditorParams};
use gamedex_common::error::AppError;
use gamedex_common::types::Editor;

use crate::routes::ListQuery;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/editor", get(list_editors).post(create_editor))
        .route(
            "/editor/{id}",
            get(get_editor).put(update_editor).delete(delete_editor),
        )
}

/// GET /editor — one cached page of editors.
async fn list_editors(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let params = query.clamp();
    let key = page_key(tags::EDITOR, params);

    let pool = state.pool.clone();
    let page = state
        .cache
        .get_or_compute(&key, &[tags::EDITOR], move || async move {
            let editors = EditorStore::list_page(&pool, params.page, params.limit).await?;
            Ok(serde_json::to_value(editors)?)
        })
        .await?;

    Ok(Json(page))
}

/// GET /editor/:id — single editor, uncached.
async fn get_editor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Editor>, AppError> {
    let editor = EditorStore::get(&state.pool, id).await?;
    Ok(Json(editor))
}

/// POST /editor — create an editor and purge every cached editor page.
async fn create_editor(
    State(state): State<AppState>,
    Json(params): Json<CreateEditorParams>,
) -> Result<(StatusCode, Json<Editor>), AppError> {
    let editor = EditorStore::create(&state.pool, &params).await?;
    state.cache.invalidate_tag(tags::EDITOR);
    Ok((StatusCode::CREATED, Json(editor)))
}

/// PUT /editor/:id — update an editor and purge every cached editor page.
async fn update_editor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(params): Json<UpdateEditorParams>,
) -> Result<Json<Editor>, AppError> {
    let editor = EditorStore::update(&state.pool, id, &params).await?;
    state.cache.invalidate_tag(tags::EDITOR);
    Ok(Json(editor))
}

/// DELETE /editor/:id — delete an editor.
///
/// Deleting an editor cascades to its games, so game pages are purged too.
async fn delete_editor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = EditorStore::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Editor {} not found", id)));
    }
    state.cache.invalidate_tag(tags::EDITOR);
    state.cache.invalidate_tag(tags::VIDEOGAME);
    Ok(StatusCode::NO_CONTENT)
}
