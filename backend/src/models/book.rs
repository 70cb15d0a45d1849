//! Book catalog models

use chrono::{DateTime, Utc};
use library_commons::model::{Book, LoanStatus};
use sqlx::FromRow;

/// Book row from the database.
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub published_at: i32,
    pub publisher: String,
    pub language: String,
    pub description: String,
    pub pages: i32,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            isbn: row.isbn,
            title: row.title,
            author: row.author,
            published_at: row.published_at,
            publisher: row.publisher,
            language: row.language,
            pages: row.pages,
            description: row.description,
            loan_status: None,
        }
    }
}

/// Book row left-joined with its open loan, if any.
#[derive(Debug, Clone, FromRow)]
pub struct BookWithLoanRow {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub published_at: i32,
    pub publisher: String,
    pub language: String,
    pub description: String,
    pub pages: i32,
    pub loan_id: Option<i64>,
    pub borrower_id: Option<i64>,
    pub borrowed_at: Option<DateTime<Utc>>,
}

impl From<BookWithLoanRow> for Book {
    fn from(row: BookWithLoanRow) -> Self {
        let loan_status = match (row.loan_id, row.borrower_id, row.borrowed_at) {
            (Some(_), Some(borrower), Some(since)) => LoanStatus::open(borrower, since),
            _ => LoanStatus::free(),
        };
        Book {
            isbn: row.isbn,
            title: row.title,
            author: row.author,
            published_at: row.published_at,
            publisher: row.publisher,
            language: row.language,
            pages: row.pages,
            description: row.description,
            loan_status: Some(loan_status),
        }
    }
}
