//! Review endpoints, scoped to a location

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::{AuthenticatedUser, MaybeUser};
use crate::{
    error::AppResult,
    models::review::{CreateReview, Review, ReviewQuery, UpdateReview},
    services::reviews::ReviewPage,
    AppState,
};

/// List the reviews of a location
#[utoipa::path(
    get,
    path = "/locations/{id}/reviews",
    tag = "reviews",
    params(
        ("id" = Uuid, Path, description = "Location ID"),
        ReviewQuery
    ),
    responses(
        (status = 200, description = "Paginated reviews with vote counts"),
        (status = 404, description = "Location not found")
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(location_id): Path<Uuid>,
    Query(query): Query<ReviewQuery>,
) -> AppResult<Json<ReviewPage>> {
    let page = state
        .services
        .reviews
        .list(location_id, &query, viewer.is_staff())
        .await?;
    Ok(Json(page))
}

/// Get a review
#[utoipa::path(
    get,
    path = "/locations/{id}/reviews/{review_id}",
    tag = "reviews",
    params(
        ("id" = Uuid, Path, description = "Location ID"),
        ("review_id" = Uuid, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Review details", body = Review),
        (status = 404, description = "Review not found")
    )
)]
pub async fn get_review(
    State(state): State<AppState>,
    Path((location_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Review>> {
    let review = state.services.reviews.get(location_id, id).await?;
    Ok(Json(review))
}

/// Review a location
#[utoipa::path(
    post,
    path = "/locations/{id}/reviews",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Location ID")
    ),
    request_body = CreateReview,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Invalid input or location already reviewed"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Location not found")
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(location_id): Path<Uuid>,
    Json(data): Json<CreateReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = state.services.reviews.create(location_id, &claims, &data).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Replace a review (author only)
#[utoipa::path(
    put,
    path = "/locations/{id}/reviews/{review_id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Location ID"),
        ("review_id" = Uuid, Path, description = "Review ID")
    ),
    request_body = CreateReview,
    responses(
        (status = 200, description = "Review updated", body = Review),
        (status = 404, description = "Review not found")
    )
)]
pub async fn replace_review(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((location_id, id)): Path<(Uuid, Uuid)>,
    Json(data): Json<CreateReview>,
) -> AppResult<Json<Review>> {
    let review = state
        .services
        .reviews
        .update(location_id, id, &claims, &data.into())
        .await?;
    Ok(Json(review))
}

/// Partially update a review (author only)
#[utoipa::path(
    patch,
    path = "/locations/{id}/reviews/{review_id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Location ID"),
        ("review_id" = Uuid, Path, description = "Review ID")
    ),
    request_body = UpdateReview,
    responses(
        (status = 200, description = "Review updated", body = Review),
        (status = 404, description = "Review not found")
    )
)]
pub async fn update_review(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((location_id, id)): Path<(Uuid, Uuid)>,
    Json(data): Json<UpdateReview>,
) -> AppResult<Json<Review>> {
    let review = state
        .services
        .reviews
        .update(location_id, id, &claims, &data)
        .await?;
    Ok(Json(review))
}

/// Delete a review (author or staff)
#[utoipa::path(
    delete,
    path = "/locations/{id}/reviews/{review_id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Location ID"),
        ("review_id" = Uuid, Path, description = "Review ID")
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn delete_review(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((location_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    state.services.reviews.delete(location_id, id, &claims).await?;
    Ok(StatusCode::NO_CONTENT)
}
