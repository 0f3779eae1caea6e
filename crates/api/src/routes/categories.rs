//! Category routes: cached paginated listing plus CRUD with tag invalidation.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use gamedex_cache::{page_key, tags};
use gamedex_catalog::categories::{CategoryStore, CreateCategoryParams, UpdateCategoryParams};
use gamedex_common::error::AppError;
use gamedex_common::types::Category;

use crate::routes::ListQuery;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/category", get(list_categories).post(create_category))
        .route(
            "/category/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
}

/// GET /category — one cached page of categories.
async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let params = query.clamp();
    let key = page_key(tags::CATEGORY, params);

    let pool = state.pool.clone();
    let page = state
        .cache
        .get_or_compute(&key, &[tags::CATEGORY], move || async move {
            let categories = CategoryStore::list_page(&pool, params.page, params.limit).await?;
            Ok(serde_json::to_value(categories)?)
        })
        .await?;

    Ok(Json(page))
}

/// GET /category/:id — single category, uncached.
async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, AppError> {
    let category = CategoryStore::get(&state.pool, id).await?;
    Ok(Json(category))
}

/// POST /category — create a category and purge every cached category page.
async fn create_category(
    State(state): State<AppState>,
    Json(params): Json<CreateCategoryParams>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = CategoryStore::create(&state.pool, &params).await?;
    state.cache.invalidate_tag(tags::CATEGORY);
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /category/:id — update a category and purge every cached category page.
async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(params): Json<UpdateCategoryParams>,
) -> Result<Json<Category>, AppError> {
    let category = CategoryStore::update(&state.pool, id, &params).await?;
    state.cache.invalidate_tag(tags::CATEGORY);
    Ok(Json(category))
}

/// DELETE /category/:id — delete a category.
///
/// Games referencing it fall back to uncategorized, so game pages are
/// purged as well.
async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = CategoryStore::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Category {} not found", id)));
    }
    state.cache.invalidate_tag(tags::CATEGORY);
    state.cache.invalidate_tag(tags::VIDEOGAME);
    Ok(StatusCode::NO_CONTENT)
}
