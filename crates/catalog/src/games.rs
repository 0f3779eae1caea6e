//! Game store — paginated listing and CRUD for catalog games.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use gamedex_common::error::AppError;
use gamedex_common::types::Game;

/// Service layer for game persistence.
pub struct GameStore;

/// Parameters for creating a new game.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateGameParams {
    pub title: String,
    pub release_date: DateTime<Utc>,
    pub description: String,
    pub editor_id: Uuid,
    pub category_id: Option<Uuid>,
}

/// Parameters for updating an existing game. Omitted fields keep their
/// current value.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UpdateGameParams {
    pub title: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub editor_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

impl GameStore {
    /// One page of the catalog, oldest first. `page` is 1-based.
    pub async fn list_page(pool: &PgPool, page: u32, limit: u32) -> Result<Vec<Game>, AppError> {
        let offset = (i64::from(page) - 1) * i64::from(limit);
        let games: Vec<Game> = sqlx::query_as(
            "SELECT * FROM games ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2",
        )
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(games)
    }

    /// Get a single game by ID.
    pub async fn get(pool: &PgPool, game_id: Uuid) -> Result<Game, AppError> {
        let game: Game = sqlx::query_as("SELECT * FROM games WHERE id = $1")
            .bind(game_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game {} not found", game_id)))?;

        Ok(game)
    }

    /// Create a new game.
    pub async fn create(pool: &PgPool, params: &CreateGameParams) -> Result<Game, AppError> {
        let id = Uuid::new_v4();

        let game: Game = sqlx::query_as(
            r#"
            INSERT INTO games (id, title, release_date, description, editor_id, category_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&params.title)
        .bind(params.release_date)
        .bind(&params.description)
        .bind(params.editor_id)
        .bind(params.category_id)
        .fetch_one(pool)
        .await?;

        tracing::info!(game_id = %game.id, title = %game.title, "Game created");

        Ok(game)
    }

    /// Update a game's fields; omitted fields are left unchanged.
    pub async fn update(
        pool: &PgPool,
        game_id: Uuid,
        params: &UpdateGameParams,
    ) -> Result<Game, AppError> {
        let existing = Self::get(pool, game_id).await?;

        let title = params.title.clone().unwrap_or(existing.title);
        let release_date = params.release_date.unwrap_or(existing.release_date);
        let description = params.description.clone().unwrap_or(existing.description);
        let editor_id = params.editor_id.unwrap_or(existing.editor_id);
        let category_id = params.category_id.or(existing.category_id);

        let game: Game = sqlx::query_as(
            r#"
            UPDATE games
            SET title = $1, release_date = $2, description = $3, editor_id = $4, category_id = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&title)
        .bind(release_date)
        .bind(&description)
        .bind(editor_id)
        .bind(category_id)
        .bind(game_id)
        .fetch_one(pool)
        .await?;

        tracing::info!(game_id = %game_id, "Game updated");

        Ok(game)
    }

    /// Delete a game. Returns true if it was deleted.
    pub async fn delete(pool: &PgPool, game_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM games WHERE id = $1")
            .bind(game_id)
            .execute(pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(game_id = %game_id, "Game deleted");
        }

        Ok(deleted)
    }
}
