//! Loans repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::loan::{LoanRow, LoanWithBookRow},
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All loans of a user, open and returned, with the book embedded.
    pub async fn find_by_user(&self, user_id: i64) -> AppResult<Vec<LoanWithBookRow>> {
        let loans = sqlx::query_as::<_, LoanWithBookRow>(
            r#"
            SELECT l.id, l.user_id, l.borrowed_at, l.returned_at,
                   b.isbn, b.title, b.author, b.published_at, b.publisher,
                   b.language, b.description, b.pages
            FROM loans l
            JOIN books b ON b.id = l.book_id
            WHERE l.user_id = $1
            ORDER BY l.borrowed_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Create a loan unless the book already has an open one.
    ///
    /// The existence check and the insert share one transaction; the partial
    /// unique index on open loans turns a concurrently created loan into a
    /// unique violation, reported as the same conflict.
    pub async fn create(&self, user_id: i64, book_id: i64) -> AppResult<LoanRow> {
        let mut tx = self.pool.begin().await?;

        let already_borrowed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE book_id = $1 AND returned_at IS NULL)",
        )
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_borrowed {
            return Err(AppError::conflict("Book is already borrowed"));
        }

        let loan = sqlx::query_as::<_, LoanRow>(
            r#"
            INSERT INTO loans (user_id, book_id, borrowed_at)
            VALUES ($1, $2, NOW())
            RETURNING id, user_id, book_id, borrowed_at, returned_at
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::conflict("Book is already borrowed")
            }
            other => AppError::Database(other),
        })?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Stamp `returned_at` on an open loan owned by `user_id`.
    ///
    /// An ownership mismatch reports the loan as missing rather than
    /// forbidden, so callers cannot probe other users' loan ids.
    pub async fn return_loan(&self, loan_id: i64, user_id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, LoanRow>("SELECT * FROM loans WHERE id = $1")
            .bind(loan_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        if loan.user_id != user_id {
            return Err(AppError::NotFound(format!(
                "Loan with id {} not found",
                loan_id
            )));
        }

        if loan.returned_at.is_some() {
            return Err(AppError::conflict("Loan is already returned"));
        }

        sqlx::query("UPDATE loans SET returned_at = NOW() WHERE id = $1")
            .bind(loan_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
