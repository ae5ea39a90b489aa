//! Locus location review server
//!
//! REST JSON API for locations, reviews and review votes. Location lists are
//! enriched with live weather resolved through a fast cache, a durable
//! object-store cache and the upstream weather API.

use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Categories
        .route("/categories", get(api::categories::list_categories))
        .route("/categories", post(api::categories::create_category))
        .route("/categories/:id", delete(api::categories::delete_category))
        // Locations
        .route("/locations", get(api::locations::list_locations))
        .route("/locations", post(api::locations::create_location))
        .route("/locations/:id", get(api::locations::get_location))
        .route("/locations/:id", put(api::locations::replace_location))
        .route("/locations/:id", patch(api::locations::update_location))
        .route("/locations/:id", delete(api::locations::delete_location))
        // Reviews
        .route("/locations/:id/reviews", get(api::reviews::list_reviews))
        .route("/locations/:id/reviews", post(api::reviews::create_review))
        .route("/locations/:id/reviews/:review_id", get(api::reviews::get_review))
        .route("/locations/:id/reviews/:review_id", put(api::reviews::replace_review))
        .route("/locations/:id/reviews/:review_id", patch(api::reviews::update_review))
        .route("/locations/:id/reviews/:review_id", delete(api::reviews::delete_review))
        // Votes
        .route("/reviews/:id/votes", post(api::votes::create_vote))
        .route("/reviews/:id/votes/:vote_id", get(api::votes::get_vote))
        .route("/reviews/:id/votes/:vote_id", put(api::votes::update_vote))
        .route("/reviews/:id/votes/:vote_id", patch(api::votes::update_vote))
        .route("/reviews/:id/votes/:vote_id", delete(api::votes::delete_vote))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
