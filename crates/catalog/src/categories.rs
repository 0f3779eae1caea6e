//! Category store — paginated listing and CRUD for catalog categories.

use sqlx::PgPool;
use uuid::Uuid;

use gamedex_common::error::AppError;
use gamedex_common::types::Category;

/// Service layer for category persistence.
pub struct CategoryStore;

/// Parameters for creating a new category.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateCategoryParams {
    pub name: String,
}

/// Parameters for updating an existing category.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UpdateCategoryParams {
    pub name: Option<String>,
}

impl CategoryStore {
    /// One page of categories, oldest first. `page` is 1-based.
    pub async fn list_page(
        pool: &PgPool,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Category>, AppError> {
        let offset = (i64::from(page) - 1) * i64::from(limit);
        let categories: Vec<Category> = sqlx::query_as(
            "SELECT * FROM categories ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2",
        )
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(categories)
    }

    /// Get a single category by ID.
    pub async fn get(pool: &PgPool, category_id: Uuid) -> Result<Category, AppError> {
        let category: Category = sqlx::query_as("SELECT * FROM categories WHERE id = $1")
            .bind(category_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", category_id)))?;

        Ok(category)
    }

    /// Create a new category.
    pub async fn create(
        pool: &PgPool,
        params: &CreateCategoryParams,
    ) -> Result<Category, AppError> {
        let id = Uuid::new_v4();

        let category: Category =
            sqlx::query_as("INSERT INTO categories (id, name) VALUES ($1, $2) RETURNING *")
                .bind(id)
                .bind(&params.name)
                .fetch_one(pool)
                .await?;

        tracing::info!(category_id = %category.id, name = %category.name, "Category created");

        Ok(category)
    }

    /// Update a category; omitted fields are left unchanged.
    pub async fn update(
        pool: &PgPool,
        category_id: Uuid,
        params: &UpdateCategoryParams,
    ) -> Result<Category, AppError> {
        let existing = Self::get(pool, category_id).await?;

        let name = params.name.clone().unwrap_or(existing.name);

        let category: Category =
            sqlx::query_as("UPDATE categories SET name = $1 WHERE id = $2 RETURNING *")
                .bind(&name)
                .bind(category_id)
                .fetch_one(pool)
                .await?;

        tracing::info!(category_id = %category_id, "Category updated");

        Ok(category)
    }

    /// Delete a category. Returns true if it was deleted.
    pub async fn delete(pool: &PgPool, category_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(category_id = %category_id, "Category deleted");
        }

        Ok(deleted)
    }
}
