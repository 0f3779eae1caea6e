//! Editor store — paginated listing and CRUD for game publishers.

use sqlx::PgPool;
use uuid::Uuid;

use gamedex_common::error::AppError;
use gamedex_common::types::Editor;

/// Service layer for editor persistence.
pub struct EditorStore;

/// Parameters for creating a new editor.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateEditorParams {
    pub name: String,
    pub country: String,
}

/// Parameters for updating an existing editor. Omitted fields keep their
/// current value.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UpdateEditorParams {
    pub name: Option<String>,
    pub country: Option<String>,
}

impl EditorStore {
    /// One page of editors, oldest first. `page` is 1-based.
    pub async fn list_page(pool: &PgPool, page: u32, limit: u32) -> Result<Vec<Editor>, AppError> {
        let offset = (i64::from(page) - 1) * i64::from(limit);
        let editors: Vec<Editor> = sqlx::query_as(
            "SELECT * FROM editors ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2",
        )
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(editors)
    }

    /// Get a single editor by ID.
    pub async fn get(pool: &PgPool, editor_id: Uuid) -> Result<Editor, AppError> {
        let editor: Editor = sqlx::query_as("SELECT * FROM editors WHERE id = $1")
            .bind(editor_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Editor {} not found", editor_id)))?;

        Ok(editor)
    }

    /// Create a new editor.
    pub async fn create(pool: &PgPool, params: &CreateEditorParams) -> Result<Editor, AppError> {
        let id = Uuid::new_v4();

        let editor: Editor = sqlx::query_as(
            "INSERT INTO editors (id, name, country) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(id)
        .bind(&params.name)
        .bind(&params.country)
        .fetch_one(pool)
        .await?;

        tracing::info!(editor_id = %editor.id, name = %editor.name, "Editor created");

        Ok(editor)
    }

    /// Update an editor's fields; omitted fields are left unchanged.
    pub async fn update(
        pool: &PgPool,
        editor_id: Uuid,
        params: &UpdateEditorParams,
    ) -> Result<Editor, AppError> {
        let existing = Self::get(pool, editor_id).await?;

        let name = params.name.clone().unwrap_or(existing.name);
        let country = params.country.clone().unwrap_or(existing.country);

        let editor: Editor = sqlx::query_as(
            "UPDATE editors SET name = $1, country = $2 WHERE id = $3 RETURNING *",
        )
        .bind(&name)
        .bind(&country)
        .bind(editor_id)
        .fetch_one(pool)
        .await?;

        tracing::info!(editor_id = %editor_id, "Editor updated");

        Ok(editor)
    }

    /// Delete an editor. Returns true if it was deleted.
    pub async fn delete(pool: &PgPool, editor_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM editors WHERE id = $1")
            .bind(editor_id)
            .execute(pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(editor_id = %editor_id, "Editor deleted");
        }

        Ok(deleted)
    }
}
