//! Book catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use library_commons::model::{Book, PageResponse};

use crate::{
    error::AppResult,
    models::page::PageQuery,
    policy::{authorize, Action},
};

use super::AuthenticatedUser;

/// Search the catalog
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Paged books with loan status", body = PageResponse<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PageResponse<Book>>> {
    authorize(&claims, Action::SearchBooks)?;

    let page = state.services.catalog.search_books(&query).await?;
    Ok(Json(page))
}

/// Get a single book by ISBN
#[utoipa::path(
    get,
    path = "/books/{isbn}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("isbn" = String, Path, description = "Book ISBN")
    ),
    responses(
        (status = 200, description = "Book with loan status", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(isbn): Path<String>,
) -> AppResult<Json<Book>> {
    authorize(&claims, Action::GetBook)?;

    let book = state.services.catalog.get_book(&isbn).await?;
    Ok(Json(book))
}
