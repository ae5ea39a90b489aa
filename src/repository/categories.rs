//! Category domain methods on Repository

use uuid::Uuid;

use super::{map_write_error, Repository};
use crate::{
    error::{AppError, AppResult},
    models::category::{Category, CreateCategory},
};

impl Repository {
    /// List all categories
    pub async fn categories_list(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get category by ID
    pub async fn categories_get_by_id(&self, id: Uuid) -> AppResult<Category> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    /// Create category
    pub async fn categories_create(&self, data: &CreateCategory) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.name.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Category not found"))
    }

    /// Delete category. Refused while any location still references it.
    pub async fn categories_delete(&self, id: Uuid) -> AppResult<()> {
        let in_use: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM locations WHERE category_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if in_use {
            return Err(AppError::Conflict(
                "Category is used by one or more locations".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                // A location was attached between the check and the delete
                let referenced =
                    matches!(&e, sqlx::Error::Database(db) if db.is_foreign_key_violation());
                if referenced {
                    AppError::Conflict("Category is used by one or more locations".to_string())
                } else {
                    AppError::Database(e)
                }
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }
        Ok(())
    }
}
