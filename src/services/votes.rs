//! Review vote service. A vote is only visible to the user who cast it.

use uuid::Uuid;

use super::list_cache::ListCache;
use crate::{
    error::{AppError, AppResult},
    models::{
        user::UserClaims,
        vote::{ReviewVote, VoteValue},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct VotesService {
    repository: Repository,
    list_cache: ListCache,
}

impl VotesService {
    pub fn new(repository: Repository, list_cache: ListCache) -> Self {
        Self {
            repository,
            list_cache,
        }
    }

    pub async fn create(
        &self,
        review_id: Uuid,
        voter: &UserClaims,
        vote: VoteValue,
    ) -> AppResult<ReviewVote> {
        if !self.repository.reviews_exists(review_id).await? {
            return Err(AppError::NotFound(format!("Review {} not found", review_id)));
        }
        self.repository.users_ensure(voter).await?;

        let created = self
            .repository
            .votes_create(review_id, voter.user_id(), vote)
            .await?;
        tracing::debug!("User {} voted {} on review {}", voter.username, vote, review_id);

        self.list_cache.invalidate().await;
        Ok(created)
    }

    pub async fn get(&self, review_id: Uuid, id: Uuid, voter: &UserClaims) -> AppResult<ReviewVote> {
        self.repository
            .votes_get_for_user(review_id, id, voter.user_id())
            .await
    }

    pub async fn update(
        &self,
        review_id: Uuid,
        id: Uuid,
        voter: &UserClaims,
        vote: VoteValue,
    ) -> AppResult<ReviewVote> {
        let updated = self
            .repository
            .votes_update_for_user(review_id, id, voter.user_id(), vote)
            .await?;
        self.list_cache.invalidate().await;
        Ok(updated)
    }

    pub async fn delete(&self, review_id: Uuid, id: Uuid, voter: &UserClaims) -> AppResult<()> {
        self.repository
            .votes_delete_for_user(review_id, id, voter.user_id())
            .await?;
        self.list_cache.invalidate().await;
        Ok(())
    }
}
