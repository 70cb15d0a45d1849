//! JSON facade over the backend API
//!
//! The data behind the rendered pages: the caller's own profile and loans,
//! catalog browsing, and the user pages for librarians. All calls relay the
//! session's bearer token; the backend stays the policy authority.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use library_commons::model::{Book, Loan, PageResponse, User};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    AppState,
};

use super::{relay_token, SessionUser};

const BOOK_PAGE_SIZE: i64 = 5;
const USER_PAGE_SIZE: i64 = 10;

/// Paging parameters accepted by the facade, passed through to the backend.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub search_string: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort: Option<String>,
}

/// Profile plus loans, as shown on the user detail pages.
#[derive(Debug, Serialize)]
pub struct UserWithLoans {
    pub user: User,
    pub loans: Vec<Loan>,
}

/// The logged-in user's own profile and loans.
pub async fn me(State(state): State<AppState>, user: SessionUser) -> AppResult<Json<UserWithLoans>> {
    let token = relay_token(&state, &user).await?;
    let username = user.session.claims.preferred_username.clone();

    let profile = state
        .backend
        .get_user(&token, &username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", username)))?;
    let loans = state.backend.loans_of_user(&token, &username).await?;

    Ok(Json(UserWithLoans {
        user: profile,
        loans,
    }))
}

/// Browse the catalog.
pub async fn books(
    State(state): State<AppState>,
    user: SessionUser,
    Query(params): Query<PageParams>,
) -> AppResult<Json<PageResponse<Book>>> {
    let token = relay_token(&state, &user).await?;

    let page = state
        .backend
        .search_books(
            &token,
            params.search_string.as_deref(),
            params.page.unwrap_or(0),
            params.size.unwrap_or(BOOK_PAGE_SIZE),
            params.sort.as_deref().unwrap_or("title"),
        )
        .await?;

    Ok(Json(page))
}

/// Book detail with loan status.
pub async fn book(
    State(state): State<AppState>,
    user: SessionUser,
    Path(isbn): Path<String>,
) -> AppResult<Json<Book>> {
    let token = relay_token(&state, &user).await?;

    let book = state
        .backend
        .get_book(&token, &isbn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with isbn {} not found", isbn)))?;

    Ok(Json(book))
}

/// User list for the librarian pages.
pub async fn users(
    State(state): State<AppState>,
    user: SessionUser,
    Query(params): Query<PageParams>,
) -> AppResult<Json<PageResponse<User>>> {
    let token = relay_token(&state, &user).await?;

    let page = state
        .backend
        .search_users(
            &token,
            params.search_string.as_deref(),
            params.page.unwrap_or(0),
            params.size.unwrap_or(USER_PAGE_SIZE),
            params.sort.as_deref().unwrap_or("firstname"),
        )
        .await?;

    Ok(Json(page))
}

/// User detail with loans for the librarian pages.
pub async fn user(
    State(state): State<AppState>,
    session_user: SessionUser,
    Path(username): Path<String>,
) -> AppResult<Json<UserWithLoans>> {
    let token = relay_token(&state, &session_user).await?;

    let profile = state
        .backend
        .get_user(&token, &username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", username)))?;
    let loans = state.backend.loans_of_user(&token, &username).await?;

    Ok(Json(UserWithLoans {
        user: profile,
        loans,
    }))
}

/// Borrow a book for the logged-in user.
pub async fn borrow_book(
    State(state): State<AppState>,
    user: SessionUser,
    Path(isbn): Path<String>,
) -> AppResult<Json<Loan>> {
    let token = relay_token(&state, &user).await?;
    let username = user.session.claims.preferred_username.clone();

    let loan = state.backend.borrow_book(&token, &isbn, &username).await?;
    Ok(Json(loan))
}

/// Return a borrowed book for the logged-in user.
pub async fn return_book(
    State(state): State<AppState>,
    user: SessionUser,
    Path(loan_id): Path<i64>,
) -> AppResult<StatusCode> {
    let token = relay_token(&state, &user).await?;
    let username = user.session.claims.preferred_username.clone();

    state.backend.return_book(&token, loan_id, &username).await?;
    Ok(StatusCode::OK)
}
