//! Loan ledger endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use library_commons::model::Loan;

use crate::{
    error::AppResult,
    policy::{authorize, Action},
};

use super::AuthenticatedUser;

/// All loans of a user, open and returned
#[utoipa::path(
    get,
    path = "/users/{userName}/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("userName" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "Loans of the user", body = Vec<Loan>),
        (status = 403, description = "Not librarian nor the user himself")
    )
)]
pub async fn get_user_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(username): Path<String>,
) -> AppResult<Json<Vec<Loan>>> {
    authorize(&claims, Action::ListLoans {
        username: &username,
    })?;

    let loans = state.services.loans.find_loans_for_user(&username).await?;
    Ok(Json(loans))
}

/// Borrow a book, identified by the raw ISBN request body
#[utoipa::path(
    post,
    path = "/users/{userName}/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("userName" = String, Path, description = "Username")
    ),
    request_body(content = String, content_type = "text/plain", description = "ISBN of the book"),
    responses(
        (status = 200, description = "Loan created", body = Loan),
        (status = 403, description = "Only the user himself may borrow"),
        (status = 404, description = "Unknown user or ISBN"),
        (status = 409, description = "Book is already borrowed")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(username): Path<String>,
    body: String,
) -> AppResult<Json<Loan>> {
    authorize(&claims, Action::BorrowBook {
        username: &username,
    })?;

    // tolerate clients posting the ISBN as a JSON string
    let isbn = body.trim().trim_matches('"');

    let loan = state.services.loans.borrow_book(isbn, &username).await?;
    Ok(Json(loan))
}

/// Return a borrowed book by stamping the loan's return timestamp
#[utoipa::path(
    delete,
    path = "/users/{userName}/loans/{loanId}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("userName" = String, Path, description = "Username"),
        ("loanId" = i64, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Book returned"),
        (status = 403, description = "Only the user himself may return"),
        (status = 404, description = "Loan absent or not owned by the caller"),
        (status = 409, description = "Loan is already returned")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((username, loan_id)): Path<(String, i64)>,
) -> AppResult<StatusCode> {
    authorize(&claims, Action::ReturnBook {
        username: &username,
    })?;

    state.services.loans.return_book(loan_id, &username).await?;
    Ok(StatusCode::OK)
}
