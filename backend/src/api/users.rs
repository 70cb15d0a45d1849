//! User directory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use library_commons::model::{PageResponse, User};

use crate::{
    error::AppResult,
    models::{page::PageQuery, user::CreateUser},
    policy::{authorize, Action},
};

use super::AuthenticatedUser;

/// List users with search and pagination
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Paged users", body = PageResponse<User>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Librarian role required")
    )
)]
pub async fn search_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PageResponse<User>>> {
    authorize(&claims, Action::SearchUsers)?;

    let page = state.services.directory.search_users(&query).await?;
    Ok(Json(page))
}

/// Get a user by username, accessible to librarians and the user himself
#[utoipa::path(
    get,
    path = "/users/{userName}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("userName" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "User profile", body = User),
        (status = 403, description = "Not librarian nor the user himself"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(username): Path<String>,
) -> AppResult<Json<User>> {
    authorize(&claims, Action::GetUser {
        username: &username,
    })?;

    let user = state.services.directory.get_user(&username).await?;
    Ok(Json(user))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Librarian role required"),
        (status = 409, description = "Username or email already exists",
            body = crate::error::ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(user): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    authorize(&claims, Action::CreateUser)?;

    let created = state.services.directory.create_user(user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Delete a user by username
#[utoipa::path(
    delete,
    path = "/users/{userName}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("userName" = String, Path, description = "Username")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Librarian role required"),
        (status = 409, description = "User has open loans")
    )
)]
pub async fn delete_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(username): Path<String>,
) -> AppResult<StatusCode> {
    authorize(&claims, Action::DeleteUser)?;

    state.services.directory.delete_user(&username).await?;
    Ok(StatusCode::NO_CONTENT)
}
