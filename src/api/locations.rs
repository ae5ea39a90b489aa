//! Location endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::{AuthenticatedUser, MaybeUser};
use crate::{
    error::AppResult,
    models::location::{CreateLocation, Location, LocationQuery, UpdateLocation},
    services::{locations::LocationPage, weather::Enriched},
    AppState,
};

/// List locations with current weather
#[utoipa::path(
    get,
    path = "/locations",
    tag = "locations",
    params(LocationQuery),
    responses(
        (status = 200, description = "Paginated locations, each with a `weather` object"),
        (status = 400, description = "Invalid ordering field"),
        (status = 404, description = "Page out of range"),
        (status = 502, description = "Weather API unreachable"),
        (status = 503, description = "Cache backend unavailable")
    )
)]
pub async fn list_locations(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<LocationPage>> {
    let page = state.services.locations.list(&query, viewer.is_staff()).await?;
    Ok(Json(page))
}

/// Get location details with current weather
#[utoipa::path(
    get,
    path = "/locations/{id}",
    tag = "locations",
    params(
        ("id" = Uuid, Path, description = "Location ID")
    ),
    responses(
        (status = 200, description = "Location details with a `weather` object", body = Location),
        (status = 404, description = "Location not found")
    )
)]
pub async fn get_location(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Enriched<Location>>> {
    let location = state.services.locations.get(id, viewer.is_staff()).await?;
    Ok(Json(location))
}

/// Create a location (staff only)
#[utoipa::path(
    post,
    path = "/locations",
    tag = "locations",
    security(("bearer_auth" = [])),
    request_body = CreateLocation,
    responses(
        (status = 201, description = "Location created", body = Location),
        (status = 400, description = "Invalid input, duplicate coordinates or address"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_location(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateLocation>,
) -> AppResult<(StatusCode, Json<Location>)> {
    claims.require_staff()?;

    let location = state.services.locations.create(&data).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// Replace a location (staff only)
#[utoipa::path(
    put,
    path = "/locations/{id}",
    tag = "locations",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Location ID")
    ),
    request_body = CreateLocation,
    responses(
        (status = 200, description = "Location updated", body = Location),
        (status = 404, description = "Location not found")
    )
)]
pub async fn replace_location(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<CreateLocation>,
) -> AppResult<Json<Location>> {
    claims.require_staff()?;

    let location = state.services.locations.update(id, &data.into()).await?;
    Ok(Json(location))
}

/// Partially update a location (staff only)
#[utoipa::path(
    patch,
    path = "/locations/{id}",
    tag = "locations",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Location ID")
    ),
    request_body = UpdateLocation,
    responses(
        (status = 200, description = "Location updated", body = Location),
        (status = 404, description = "Location not found")
    )
)]
pub async fn update_location(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateLocation>,
) -> AppResult<Json<Location>> {
    claims.require_staff()?;

    let location = state.services.locations.update(id, &data).await?;
    Ok(Json(location))
}

/// Deactivate a location (staff only). Reviews are kept.
#[utoipa::path(
    delete,
    path = "/locations/{id}",
    tag = "locations",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Location ID")
    ),
    responses(
        (status = 204, description = "Location deactivated"),
        (status = 404, description = "Location not found")
    )
)]
pub async fn delete_location(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;

    state.services.locations.deactivate(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
