//! Review model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::user::UserShort;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// Internal row structure for annotated review queries
#[derive(Debug, Clone, FromRow)]
pub struct ReviewRow {
    id: Uuid,
    location_id: Uuid,
    user_id: Uuid,
    username: String,
    title: String,
    body: String,
    rating: i16,
    created_at: DateTime<Utc>,
    upvote_count: i64,
    downvote_count: i64,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            location_id: row.location_id,
            user: UserShort {
                id: row.user_id,
                username: row.username,
            },
            title: row.title,
            body: row.body,
            rating: row.rating,
            created_at: row.created_at,
            upvote_count: row.upvote_count,
            downvote_count: row.downvote_count,
        }
    }
}

/// Review with its author and vote tallies
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub location_id: Uuid,
    pub user: UserShort,
    pub title: String,
    pub body: String,
    pub rating: i16,
    pub created_at: DateTime<Utc>,
    pub upvote_count: i64,
    pub downvote_count: i64,
}

impl Review {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user.id == user_id
    }
}

/// Create review request (also used for full replacement with PUT)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReview {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,
    #[validate(length(max = 2000, message = "Body must be at most 2000 characters"))]
    pub body: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
}

/// Partial review update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateReview {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "Body must be at most 2000 characters"))]
    pub body: Option<String>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i16>,
}

impl From<CreateReview> for UpdateReview {
    fn from(data: CreateReview) -> Self {
        UpdateReview {
            title: Some(data.title),
            body: Some(data.body),
            rating: Some(data.rating),
        }
    }
}

/// Review list query parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ReviewQuery {
    /// Page number (default: 1)
    pub page: Option<i64>,
    /// Items per page (default: 30)
    pub page_size: Option<i64>,
}
