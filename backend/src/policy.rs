//! Access policy for the REST surface
//!
//! One explicit allow/deny decision per operation, evaluated before the
//! handler body runs. Identity is the `preferred_username` claim,
//! capabilities come from the token's realm roles.

use library_commons::security::Claims;

use crate::error::AppError;

/// Operation about to be executed, with its target identifiers.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    SearchBooks,
    GetBook,
    SearchUsers,
    GetUser { username: &'a str },
    ListLoans { username: &'a str },
    BorrowBook { username: &'a str },
    ReturnBook { username: &'a str },
    CreateUser,
    DeleteUser,
}

/// Decide whether the caller may perform the action.
pub fn authorize(claims: &Claims, action: Action<'_>) -> Result<(), AppError> {
    let allowed = match action {
        // any authenticated identity may read the catalog
        Action::SearchBooks | Action::GetBook => true,
        Action::SearchUsers | Action::CreateUser | Action::DeleteUser => claims.is_librarian(),
        Action::GetUser { username } | Action::ListLoans { username } => {
            claims.is_librarian() || claims.is_self(username)
        }
        // librarians cannot borrow or return on behalf of someone else
        Action::BorrowBook { username } | Action::ReturnBook { username } => {
            claims.is_self(username)
        }
    };

    if allowed {
        Ok(())
    } else {
        Err(AppError::Authorization("Access denied".to_string()))
    }
}
