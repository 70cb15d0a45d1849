//! Loan ledger models

use chrono::{DateTime, Utc};
use library_commons::model::{Book, Loan};
use sqlx::FromRow;

/// Loan row from the database.
#[derive(Debug, Clone, FromRow)]
pub struct LoanRow {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

/// Loan row joined with the borrowed book's details.
#[derive(Debug, Clone, FromRow)]
pub struct LoanWithBookRow {
    pub id: i64,
    pub user_id: i64,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub published_at: i32,
    pub publisher: String,
    pub language: String,
    pub description: String,
    pub pages: i32,
}

impl From<LoanWithBookRow> for Loan {
    fn from(row: LoanWithBookRow) -> Self {
        Loan {
            id: row.id,
            book: Book {
                isbn: row.isbn,
                title: row.title,
                author: row.author,
                published_at: row.published_at,
                publisher: row.publisher,
                language: row.language,
                pages: row.pages,
                description: row.description,
                loan_status: None,
            },
            borrowed_at: row.borrowed_at,
            returned_at: row.returned_at,
        }
    }
}
