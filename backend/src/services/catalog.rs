//! Book catalog service

use library_commons::model::{Book, PageResponse};

use crate::{error::AppResult, models::page::PageQuery, repository::Repository};

const DEFAULT_PAGE_SIZE: i64 = 10;
const DEFAULT_SORT: &str = "title";

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search books with their loan status, paginated.
    pub async fn search_books(&self, query: &PageQuery) -> AppResult<PageResponse<Book>> {
        let page = query.page.unwrap_or(0).max(0);
        let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);
        let sort = query.sort.as_deref().unwrap_or(DEFAULT_SORT);

        let (rows, total) = self
            .repository
            .books
            .search(query.search(), page, size, sort)
            .await?;

        Ok(PageResponse::new(
            rows.into_iter().map(Book::from).collect(),
            page,
            size,
            total,
        ))
    }

    /// Get a single book with its loan status by ISBN.
    pub async fn get_book(&self, isbn: &str) -> AppResult<Book> {
        let row = self.repository.books.get_by_isbn_with_loan(isbn).await?;
        Ok(row.into())
    }
}
