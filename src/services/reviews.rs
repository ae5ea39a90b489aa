//! Review service

use uuid::Uuid;
use validator::Validate;

use super::{
    list_cache::{ListCache, ListScope},
    locations::{check_page, visibility},
};
use crate::{
    config::PaginationConfig,
    error::{AppError, AppResult},
    models::{
        review::{CreateReview, Review, ReviewQuery, UpdateReview},
        user::UserClaims,
        PaginatedResponse,
    },
    repository::Repository,
};

pub type ReviewPage = PaginatedResponse<Review>;

/// Hide reviews from callers that may not modify them
fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Review {} not found", id))
}

#[derive(Clone)]
pub struct ReviewsService {
    repository: Repository,
    list_cache: ListCache,
    pagination: PaginationConfig,
}

impl ReviewsService {
    pub fn new(repository: Repository, list_cache: ListCache, pagination: PaginationConfig) -> Self {
        Self {
            repository,
            list_cache,
            pagination,
        }
    }

    async fn ensure_location(&self, location_id: Uuid, include_inactive: bool) -> AppResult<()> {
        if !self.repository.locations_exists(location_id, include_inactive).await? {
            return Err(AppError::NotFound(format!("Location {} not found", location_id)));
        }
        Ok(())
    }

    /// Reviews of a location with vote tallies
    pub async fn list(
        &self,
        location_id: Uuid,
        query: &ReviewQuery,
        include_inactive: bool,
    ) -> AppResult<ReviewPage> {
        let (page, per_page, offset) = self.pagination.window(query.page, query.page_size)?;

        let key = self.list_cache.key(
            ListScope::Reviews,
            &(location_id, query),
            visibility(include_inactive),
        );
        if let Some(cached) = self.list_cache.get::<ReviewPage>(&key).await {
            return Ok(cached);
        }

        self.ensure_location(location_id, include_inactive).await?;
        let (results, total) = self.repository.reviews_list(location_id, per_page, offset).await?;
        check_page(page, offset, total)?;

        let response = PaginatedResponse {
            count: total,
            page,
            page_size: per_page,
            results,
        };
        self.list_cache.put(&key, &response).await;
        Ok(response)
    }

    pub async fn get(&self, location_id: Uuid, id: Uuid) -> AppResult<Review> {
        self.repository.reviews_get_by_id(location_id, id).await
    }

    /// Review a location as the calling user; one review per location
    pub async fn create(
        &self,
        location_id: Uuid,
        author: &UserClaims,
        data: &CreateReview,
    ) -> AppResult<Review> {
        data.validate()?;
        self.ensure_location(location_id, author.is_staff).await?;
        self.repository.users_ensure(author).await?;

        let review = self
            .repository
            .reviews_create(location_id, author.user_id(), data)
            .await?;
        tracing::info!("User {} reviewed location {}", author.username, location_id);

        self.list_cache.invalidate().await;
        Ok(review)
    }

    /// Only the author may edit a review
    pub async fn update(
        &self,
        location_id: Uuid,
        id: Uuid,
        caller: &UserClaims,
        data: &UpdateReview,
    ) -> AppResult<Review> {
        data.validate()?;
        let review = self.repository.reviews_get_by_id(location_id, id).await?;
        if !review.is_owned_by(caller.user_id()) {
            return Err(not_found(id));
        }

        let review = self.repository.reviews_update(location_id, id, data).await?;
        self.list_cache.invalidate().await;
        Ok(review)
    }

    /// The author or staff may delete a review
    pub async fn delete(&self, location_id: Uuid, id: Uuid, caller: &UserClaims) -> AppResult<()> {
        let review = self.repository.reviews_get_by_id(location_id, id).await?;
        if !review.is_owned_by(caller.user_id()) && !caller.is_staff {
            return Err(not_found(id));
        }

        self.repository.reviews_delete(location_id, id).await?;
        tracing::info!("Deleted review {} of location {}", id, location_id);

        self.list_cache.invalidate().await;
        Ok(())
    }
}
