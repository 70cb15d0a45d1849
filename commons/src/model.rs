//! Wire model shared between the backend API and the gateway

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Loan status of a single book, embedded in catalog responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LoanStatus {
    /// True when the book has no open loan.
    pub available: bool,
    pub borrowed_by: Option<i64>,
    pub borrowed_at: Option<DateTime<Utc>>,
}

impl LoanStatus {
    /// Status of a book without an open loan.
    pub fn free() -> Self {
        Self {
            available: true,
            borrowed_by: None,
            borrowed_at: None,
        }
    }

    /// Status of a book that is currently out.
    pub fn open(borrower: i64, since: DateTime<Utc>) -> Self {
        Self {
            available: false,
            borrowed_by: Some(borrower),
            borrowed_at: Some(since),
        }
    }
}

/// A catalogued book, optionally annotated with its loan status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    pub author: String,
    /// Publication year.
    pub published_at: i32,
    pub publisher: String,
    pub language: String,
    pub pages: i32,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_status: Option<LoanStatus>,
}

/// A library user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// A loan with the borrowed book embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Loan {
    pub id: i64,
    pub book: Book,
    pub borrowed_at: DateTime<Utc>,
    /// Unset while the book is out.
    pub returned_at: Option<DateTime<Utc>>,
}

/// Page envelope for paged search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PageResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub content: Vec<T>,
    /// Zero-based page number.
    pub page: i64,
    pub size: i64,
    pub total_pages: i64,
    pub total_elements: i64,
    pub first: bool,
    pub last: bool,
    pub number_of_elements: i64,
    pub empty: bool,
}

impl<T> PageResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Assemble the envelope for one page slice of `total_elements` results.
    pub fn new(content: Vec<T>, page: i64, size: i64, total_elements: i64) -> Self {
        let total_pages = if size > 0 {
            (total_elements + size - 1) / size
        } else {
            0
        };
        Self {
            first: page == 0,
            last: page + 1 >= total_pages,
            number_of_elements: content.len() as i64,
            empty: content.is_empty(),
            content,
            page,
            size,
            total_pages,
            total_elements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(count: usize) -> Vec<User> {
        (0..count)
            .map(|i| User {
                username: format!("user_{}", i),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                email: format!("user_{}@example.com", i),
            })
            .collect()
    }

    #[test]
    fn page_envelope_arithmetic() {
        let page = PageResponse::new(users(3), 0, 3, 7);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.number_of_elements, 3);
        assert!(page.first);
        assert!(!page.last);
        assert!(!page.empty);
    }

    #[test]
    fn last_page_is_flagged() {
        let page = PageResponse::new(users(1), 2, 3, 7);
        assert!(!page.first);
        assert!(page.last);
        assert_eq!(page.number_of_elements, 1);
    }

    #[test]
    fn empty_result_set() {
        let page = PageResponse::<User>::new(Vec::new(), 0, 10, 0);
        assert!(page.empty);
        assert!(page.first);
        assert!(page.last);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn loan_status_constructors() {
        assert!(LoanStatus::free().available);
        let status = LoanStatus::open(42, Utc::now());
        assert!(!status.available);
        assert_eq!(status.borrowed_by, Some(42));
    }
}
