//! API handlers for the library REST endpoints

pub mod books;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use library_commons::security::Claims;

use crate::{error::AppError, AppState};

/// Extractor for the authenticated caller, validated against the provider's key set.
pub struct AuthenticatedUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Authentication("Invalid authorization header format".to_string())
        })?;

        let claims = state
            .verifier
            .verify(token)
            .await
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        tracing::debug!(
            username = %claims.preferred_username,
            authorities = ?claims.authorities(),
            "authenticated request"
        );

        Ok(AuthenticatedUser(claims))
    }
}
