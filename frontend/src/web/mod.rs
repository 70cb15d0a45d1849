//! Web handlers for the gateway

pub mod admin;
pub mod auth;
pub mod health;
pub mod library;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    session::{Session, SESSION_COOKIE},
    AppState,
};

/// Extractor for the logged-in session behind the session cookie.
pub struct SessionUser {
    pub id: Uuid,
    pub session: Session,
}

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Unauthenticated)?;

        let id = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| cookie.value().parse::<Uuid>().ok())
            .ok_or(AppError::Unauthenticated)?;

        let session = state.sessions.get(&id).await.ok_or(AppError::Unauthenticated)?;

        Ok(SessionUser { id, session })
    }
}

/// Current bearer token for the session, refreshed through the provider when
/// expired. A session whose tokens cannot be refreshed is dropped.
pub async fn relay_token(state: &AppState, user: &SessionUser) -> Result<String, AppError> {
    if !user.session.access_token_expired() {
        return Ok(user.session.access_token.clone());
    }

    let Some(refresh_token) = user.session.refresh_token.clone() else {
        state.sessions.remove(&user.id).await;
        return Err(AppError::Unauthenticated);
    };

    let tokens = match state.oidc.refresh(&refresh_token).await {
        Ok(tokens) => tokens,
        Err(err) => {
            tracing::debug!("token refresh failed, dropping session: {}", err);
            state.sessions.remove(&user.id).await;
            return Err(AppError::Unauthenticated);
        }
    };

    let expires_at = Utc::now() + Duration::seconds(tokens.expires_in);
    state
        .sessions
        .update_tokens(
            &user.id,
            tokens.access_token.clone(),
            tokens.refresh_token,
            expires_at,
        )
        .await;

    Ok(tokens.access_token)
}
