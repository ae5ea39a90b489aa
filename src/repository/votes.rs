//! Review vote domain methods on Repository

use uuid::Uuid;

use super::{map_write_error, Repository};
use crate::{
    error::{AppError, AppResult},
    models::vote::{ReviewVote, VoteValue},
};

impl Repository {
    /// Cast a vote on a review; one vote per (review, user)
    pub async fn votes_create(
        &self,
        review_id: Uuid,
        user_id: Uuid,
        vote: VoteValue,
    ) -> AppResult<ReviewVote> {
        sqlx::query_as::<_, ReviewVote>(
            r#"
            INSERT INTO review_votes (id, review_id, user_id, vote)
            VALUES ($1, $2, $3, $4)
            RETURNING id, review_id, user_id, vote, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(review_id)
        .bind(user_id)
        .bind(vote)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Review not found"))
    }

    /// A vote on a review, visible only to the user who cast it
    pub async fn votes_get_for_user(
        &self,
        review_id: Uuid,
        id: Uuid,
        user_id: Uuid,
    ) -> AppResult<ReviewVote> {
        sqlx::query_as::<_, ReviewVote>(
            r#"
            SELECT id, review_id, user_id, vote, created_at, updated_at
            FROM review_votes
            WHERE review_id = $1 AND id = $2 AND user_id = $3
            "#,
        )
        .bind(review_id)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Vote not found".to_string()))
    }

    /// Change a vote cast by `user_id`
    pub async fn votes_update_for_user(
        &self,
        review_id: Uuid,
        id: Uuid,
        user_id: Uuid,
        vote: VoteValue,
    ) -> AppResult<ReviewVote> {
        sqlx::query_as::<_, ReviewVote>(
            r#"
            UPDATE review_votes SET vote = $4, updated_at = NOW()
            WHERE review_id = $1 AND id = $2 AND user_id = $3
            RETURNING id, review_id, user_id, vote, created_at, updated_at
            "#,
        )
        .bind(review_id)
        .bind(id)
        .bind(user_id)
        .bind(vote)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Vote not found".to_string()))
    }

    /// Withdraw a vote cast by `user_id`
    pub async fn votes_delete_for_user(&self, review_id: Uuid, id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "DELETE FROM review_votes WHERE review_id = $1 AND id = $2 AND user_id = $3",
        )
        .bind(review_id)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Vote not found".to_string()));
        }
        Ok(())
    }
}
