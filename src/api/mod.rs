//! API handlers for Locus REST endpoints

pub mod categories;
pub mod health;
pub mod locations;
pub mod openapi;
pub mod reviews;
pub mod votes;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{error::AppError, models::user::UserClaims, AppState};

fn bearer_claims(parts: &Parts, state: &AppState) -> Result<Option<UserClaims>, AppError> {
    // Get the Authorization header
    let Some(auth_header) = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    else {
        return Ok(None);
    };

    // Check for Bearer token
    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return Err(AppError::Authentication("Invalid authorization header format".to_string()));
    };

    // Validate JWT token using the secret from configuration
    let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
        .map_err(|e| AppError::Authentication(e.to_string()))?;

    Ok(Some(claims))
}

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        bearer_claims(parts, state)?
            .map(AuthenticatedUser)
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))
    }
}

/// Optional authentication for read endpoints. A present but invalid token
/// is still rejected.
pub struct MaybeUser(pub Option<UserClaims>);

impl MaybeUser {
    /// Staff see inactive locations too
    pub fn is_staff(&self) -> bool {
        self.0.as_ref().is_some_and(|claims| claims.is_staff)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(bearer_claims(parts, state)?))
    }
}
