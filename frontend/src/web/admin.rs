//! Admin-only user provisioning

use axum::{extract::State, http::StatusCode, Json};
use library_commons::model::User;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    AppState,
};

use super::{relay_token, SessionUser};

/// Provisioning request from the admin page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Initial password for the identity provider account.
    pub password: String,
}

/// Create the user in the backend and mirror it into the identity provider.
///
/// The provider call comes second; when it fails the freshly created backend
/// user is deleted again so both stores stay in step.
pub async fn create_user(
    State(state): State<AppState>,
    user: SessionUser,
    Json(request): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    if !user.session.claims.is_librarian() {
        return Err(AppError::Forbidden("librarian role required".to_string()));
    }

    let token = relay_token(&state, &user).await?;
    let new_user = User {
        username: request.username,
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
    };

    let created = state.backend.create_user(&token, &new_user).await?;

    if let Err(err) = state.keycloak.create_user(&created, &request.password).await {
        tracing::error!(
            username = %created.username,
            "provider user creation failed, rolling back: {}", err
        );
        if let Err(rollback_err) = state.backend.delete_user(&token, &created.username).await {
            tracing::error!(
                username = %created.username,
                "rollback failed, user exists only in the backend: {}", rollback_err
            );
        }
        return Err(err);
    }

    Ok((StatusCode::CREATED, Json(created)))
}
