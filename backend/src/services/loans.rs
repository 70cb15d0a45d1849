//! Loan ledger service

use library_commons::model::{Book, Loan};

use crate::{error::AppResult, repository::Repository};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All loans of a user, open and returned. Unknown users yield an empty list.
    pub async fn find_loans_for_user(&self, username: &str) -> AppResult<Vec<Loan>> {
        let Some(user) = self.repository.users.find_by_username(username).await? else {
            return Ok(Vec::new());
        };

        let rows = self.repository.loans.find_by_user(user.id).await?;
        Ok(rows.into_iter().map(Loan::from).collect())
    }

    /// Borrow a book for a user.
    ///
    /// Fails with not-found for an unknown user or ISBN and with a conflict
    /// when the book already has an open loan.
    pub async fn borrow_book(&self, isbn: &str, username: &str) -> AppResult<Loan> {
        let user = self.repository.users.get_by_username(username).await?;
        let book = self.repository.books.get_by_isbn(isbn).await?;

        let loan = self.repository.loans.create(user.id, book.id).await?;
        tracing::info!(isbn, username, loan_id = loan.id, "book borrowed");

        Ok(Loan {
            id: loan.id,
            book: Book::from(book),
            borrowed_at: loan.borrowed_at,
            returned_at: loan.returned_at,
        })
    }

    /// Return a borrowed book by stamping the loan's return timestamp.
    pub async fn return_book(&self, loan_id: i64, username: &str) -> AppResult<()> {
        let user = self.repository.users.get_by_username(username).await?;
        self.repository.loans.return_loan(loan_id, user.id).await?;
        tracing::info!(loan_id, username, "book returned");
        Ok(())
    }
}
