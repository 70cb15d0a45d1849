//! Login flow against the identity provider

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::{Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    session::{Session, SESSION_COOKIE, STATE_COOKIE},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

/// Start the authorization-code flow.
pub async fn login(State(state): State<AppState>, jar: CookieJar) -> AppResult<impl IntoResponse> {
    let login_state = Uuid::new_v4().to_string();
    let url = state.oidc.authorize_url(&login_state)?;

    let cookie = Cookie::build((STATE_COOKIE, login_state))
        .path("/")
        .http_only(true)
        .build();

    Ok((jar.add(cookie), Redirect::to(&url)))
}

/// Complete the flow: state check, code exchange, token verification,
/// session creation.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> AppResult<impl IntoResponse> {
    let expected = jar
        .get(STATE_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| AppError::Login("missing login state cookie".to_string()))?;

    if expected != params.state {
        return Err(AppError::Login("login state mismatch".to_string()));
    }

    let tokens = state.oidc.exchange_code(&params.code).await?;
    let claims = state.oidc.verify(&tokens.access_token).await?;
    tracing::info!(username = %claims.preferred_username, "login completed");

    let session = Session {
        claims,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        access_token_expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
    };
    let id = state.sessions.insert(session).await;

    let jar = jar.remove(Cookie::from(STATE_COOKIE)).add(
        Cookie::build((SESSION_COOKIE, id.to_string()))
            .path("/")
            .http_only(true)
            .build(),
    );

    Ok((jar, Redirect::to("/library/rest/me")))
}

/// Drop the session.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> AppResult<impl IntoResponse> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Ok(id) = cookie.value().parse::<Uuid>() {
            state.sessions.remove(&id).await;
        }
    }

    Ok((jar.remove(Cookie::from(SESSION_COOKIE)), Redirect::to("/")))
}
