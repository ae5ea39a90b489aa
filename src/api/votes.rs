//! Review vote endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::AuthenticatedUser;
use crate::{
    error::AppResult,
    models::vote::{CastVote, ReviewVote},
    AppState,
};

/// Vote on a review
#[utoipa::path(
    post,
    path = "/reviews/{id}/votes",
    tag = "votes",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Review ID")
    ),
    request_body = CastVote,
    responses(
        (status = 201, description = "Vote recorded", body = ReviewVote),
        (status = 400, description = "Invalid vote or already voted"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn create_vote(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(review_id): Path<Uuid>,
    Json(data): Json<CastVote>,
) -> AppResult<(StatusCode, Json<ReviewVote>)> {
    let vote = state.services.votes.create(review_id, &claims, data.vote).await?;
    Ok((StatusCode::CREATED, Json(vote)))
}

/// Get one of your votes
#[utoipa::path(
    get,
    path = "/reviews/{id}/votes/{vote_id}",
    tag = "votes",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Review ID"),
        ("vote_id" = Uuid, Path, description = "Vote ID")
    ),
    responses(
        (status = 200, description = "Vote details", body = ReviewVote),
        (status = 404, description = "No such vote by the caller")
    )
)]
pub async fn get_vote(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((review_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ReviewVote>> {
    let vote = state.services.votes.get(review_id, id, &claims).await?;
    Ok(Json(vote))
}

/// Change one of your votes
#[utoipa::path(
    put,
    path = "/reviews/{id}/votes/{vote_id}",
    tag = "votes",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Review ID"),
        ("vote_id" = Uuid, Path, description = "Vote ID")
    ),
    request_body = CastVote,
    responses(
        (status = 200, description = "Vote updated", body = ReviewVote),
        (status = 404, description = "No such vote by the caller")
    )
)]
pub async fn update_vote(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((review_id, id)): Path<(Uuid, Uuid)>,
    Json(data): Json<CastVote>,
) -> AppResult<Json<ReviewVote>> {
    let vote = state
        .services
        .votes
        .update(review_id, id, &claims, data.vote)
        .await?;
    Ok(Json(vote))
}

/// Withdraw one of your votes
#[utoipa::path(
    delete,
    path = "/reviews/{id}/votes/{vote_id}",
    tag = "votes",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Review ID"),
        ("vote_id" = Uuid, Path, description = "Vote ID")
    ),
    responses(
        (status = 204, description = "Vote removed"),
        (status = 404, description = "No such vote by the caller")
    )
)]
pub async fn delete_vote(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((review_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    state.services.votes.delete(review_id, id, &claims).await?;
    Ok(StatusCode::NO_CONTENT)
}
