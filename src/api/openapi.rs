//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{categories, health, locations, reviews, votes};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Locus API",
        version = "1.0.0",
        description = "Location reviews with live weather",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Categories
        categories::list_categories,
        categories::create_category,
        categories::delete_category,
        // Locations
        locations::list_locations,
        locations::get_location,
        locations::create_location,
        locations::replace_location,
        locations::update_location,
        locations::delete_location,
        // Reviews
        reviews::list_reviews,
        reviews::get_review,
        reviews::create_review,
        reviews::replace_review,
        reviews::update_review,
        reviews::delete_review,
        // Votes
        votes::create_vote,
        votes::get_vote,
        votes::update_vote,
        votes::delete_vote,
    ),
    components(
        schemas(
            crate::models::category::Category,
            crate::models::category::CategoryShort,
            crate::models::category::CreateCategory,
            crate::models::location::Location,
            crate::models::location::LocationSummary,
            crate::models::location::CreateLocation,
            crate::models::location::UpdateLocation,
            crate::models::review::Review,
            crate::models::review::CreateReview,
            crate::models::review::UpdateReview,
            crate::models::user::UserShort,
            crate::models::vote::ReviewVote,
            crate::models::vote::CastVote,
            crate::models::weather::CurrentWeather,
            crate::models::weather::WeatherReport,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "categories", description = "Location categories"),
        (name = "locations", description = "Locations with live weather"),
        (name = "reviews", description = "Location reviews"),
        (name = "votes", description = "Review votes")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
