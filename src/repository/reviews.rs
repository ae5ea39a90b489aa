//! Review domain methods on Repository

use uuid::Uuid;

use super::{map_write_error, Repository};
use crate::{
    error::{AppError, AppResult},
    models::review::{CreateReview, Review, ReviewRow, UpdateReview},
};

/// Reviews joined with their author and vote tallies
const ANNOTATED_REVIEWS: &str = r#"
    SELECT r.id, r.location_id, r.user_id, u.username, r.title, r.body, r.rating, r.created_at,
           COUNT(v.id) FILTER (WHERE v.vote = 1) AS upvote_count,
           COUNT(v.id) FILTER (WHERE v.vote = -1) AS downvote_count
    FROM reviews r
    JOIN users u ON u.id = r.user_id
    LEFT JOIN review_votes v ON v.review_id = r.id
"#;

impl Repository {
    /// List the reviews of a location, newest first
    pub async fn reviews_list(
        &self,
        location_id: Uuid,
        per_page: i64,
        offset: i64,
    ) -> AppResult<(Vec<Review>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE location_id = $1")
            .bind(location_id)
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            r#"
            {}
            WHERE r.location_id = $1
            GROUP BY r.id, u.username
            ORDER BY r.created_at DESC, r.id ASC
            LIMIT {} OFFSET {}
            "#,
            ANNOTATED_REVIEWS, per_page, offset
        );
        let rows = sqlx::query_as::<_, ReviewRow>(&query)
            .bind(location_id)
            .fetch_all(&self.pool)
            .await?;

        Ok((rows.into_iter().map(Review::from).collect(), total))
    }

    /// Get a review of a location by ID
    pub async fn reviews_get_by_id(&self, location_id: Uuid, id: Uuid) -> AppResult<Review> {
        let query = format!(
            "{} WHERE r.location_id = $1 AND r.id = $2 GROUP BY r.id, u.username",
            ANNOTATED_REVIEWS
        );
        sqlx::query_as::<_, ReviewRow>(&query)
            .bind(location_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Review::from)
            .ok_or_else(|| AppError::NotFound(format!("Review {} not found", id)))
    }

    /// Whether a review exists, whatever its location
    pub async fn reviews_exists(&self, id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reviews WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Create a review authored by `user_id`
    pub async fn reviews_create(
        &self,
        location_id: Uuid,
        user_id: Uuid,
        data: &CreateReview,
    ) -> AppResult<Review> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO reviews (id, location_id, user_id, title, body, rating)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(location_id)
        .bind(user_id)
        .bind(&data.title)
        .bind(&data.body)
        .bind(data.rating)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Location not found"))?;

        self.reviews_get_by_id(location_id, id).await
    }

    /// Update the provided fields of a review
    pub async fn reviews_update(
        &self,
        location_id: Uuid,
        id: Uuid,
        data: &UpdateReview,
    ) -> AppResult<Review> {
        let mut sets = vec!["updated_at = NOW()".to_string()];
        let mut idx = 3;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.title, "title");
        add_field!(data.body, "body");
        add_field!(data.rating, "rating");

        let query = format!(
            "UPDATE reviews SET {} WHERE location_id = $1 AND id = $2",
            sets.join(", ")
        );

        let mut builder = sqlx::query(&query).bind(location_id).bind(id);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.title);
        bind_field!(data.body);
        bind_field!(data.rating);

        let result = builder.execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Review {} not found", id)));
        }

        self.reviews_get_by_id(location_id, id).await
    }

    /// Delete a review (its votes go with it)
    pub async fn reviews_delete(&self, location_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE location_id = $1 AND id = $2")
            .bind(location_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Review {} not found", id)));
        }
        Ok(())
    }
}
