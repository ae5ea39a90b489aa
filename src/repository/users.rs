//! Local mirror of externally authenticated users

use super::Repository;
use crate::{error::AppResult, models::user::UserClaims};

impl Repository {
    /// Make sure the token holder has a local row so reviews and votes can
    /// reference it. Username and staff flag follow the latest token.
    pub async fn users_ensure(&self, claims: &UserClaims) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, is_staff)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
                SET username = EXCLUDED.username, is_staff = EXCLUDED.is_staff
            "#,
        )
        .bind(claims.sub)
        .bind(&claims.username)
        .bind(claims.is_staff)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
