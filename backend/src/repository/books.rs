//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{BookRow, BookWithLoanRow},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Map the requested sort field to a column; unknown fields sort by title.
    fn sort_column(sort: &str) -> &'static str {
        match sort {
            "author" => "b.author",
            "isbn" => "b.isbn",
            "publishedAt" | "published_at" => "b.published_at",
            "publisher" => "b.publisher",
            _ => "b.title",
        }
    }

    /// Search books with their loan status, paginated.
    ///
    /// The free-text filter matches title, author or ISBN as a
    /// case-insensitive substring.
    pub async fn search(
        &self,
        search: Option<&str>,
        page: i64,
        size: i64,
        sort: &str,
    ) -> AppResult<(Vec<BookWithLoanRow>, i64)> {
        let pattern = search.map(|s| format!("%{}%", s.to_lowercase()));
        let offset = page * size;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM books b
            WHERE ($1::text IS NULL
                OR LOWER(b.title) LIKE $1
                OR LOWER(b.author) LIKE $1
                OR LOWER(b.isbn) LIKE $1)
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let query = format!(
            r#"
            SELECT b.id, b.isbn, b.title, b.author, b.published_at, b.publisher,
                   b.language, b.description, b.pages,
                   l.id as loan_id, l.user_id as borrower_id, l.borrowed_at
            FROM books b
            LEFT JOIN loans l ON l.book_id = b.id AND l.returned_at IS NULL
            WHERE ($1::text IS NULL
                OR LOWER(b.title) LIKE $1
                OR LOWER(b.author) LIKE $1
                OR LOWER(b.isbn) LIKE $1)
            ORDER BY {}
            LIMIT $2 OFFSET $3
            "#,
            Self::sort_column(sort)
        );

        let rows = sqlx::query_as::<_, BookWithLoanRow>(&query)
            .bind(&pattern)
            .bind(size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    /// Get a book together with its open loan by ISBN.
    pub async fn get_by_isbn_with_loan(&self, isbn: &str) -> AppResult<BookWithLoanRow> {
        sqlx::query_as::<_, BookWithLoanRow>(
            r#"
            SELECT b.id, b.isbn, b.title, b.author, b.published_at, b.publisher,
                   b.language, b.description, b.pages,
                   l.id as loan_id, l.user_id as borrower_id, l.borrowed_at
            FROM books b
            LEFT JOIN loans l ON l.book_id = b.id AND l.returned_at IS NULL
            WHERE b.isbn = $1
            "#,
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with isbn {} not found", isbn)))
    }

    /// Get the bare book row by ISBN.
    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<BookRow> {
        sqlx::query_as::<_, BookRow>("SELECT * FROM books WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with isbn {} not found", isbn)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_field_falls_back_to_title() {
        assert_eq!(BooksRepository::sort_column("author"), "b.author");
        assert_eq!(BooksRepository::sort_column("publishedAt"), "b.published_at");
        assert_eq!(
            BooksRepository::sort_column("title; DROP TABLE books"),
            "b.title"
        );
    }
}
