//! Token-relay client for the library backend
//!
//! Every call attaches the caller's bearer token; responses are logged at a
//! single call site and backend failure statuses are mapped to typed errors.

use library_commons::model::{Book, Loan, PageResponse, User};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Default, Deserialize)]
struct BackendErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    hints: Option<String>,
}

pub struct LibraryBackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl LibraryBackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Search books from the backend using pagination.
    pub async fn search_books(
        &self,
        token: &str,
        search: Option<&str>,
        page: i64,
        size: i64,
        sort: &str,
    ) -> AppResult<PageResponse<Book>> {
        let mut params = vec![
            ("page", page.to_string()),
            ("size", size.to_string()),
            ("sort", sort.to_string()),
        ];
        if let Some(search) = search {
            params.push(("searchString", search.to_string()));
        }

        let response = self
            .execute(
                self.http
                    .get(self.url("/library/api/books"))
                    .query(&params)
                    .bearer_auth(token),
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Retrieve a book by ISBN; an unknown ISBN is not an error.
    pub async fn get_book(&self, token: &str, isbn: &str) -> AppResult<Option<Book>> {
        let result = self
            .execute(
                self.http
                    .get(self.url(&format!("/library/api/books/{}", isbn)))
                    .bearer_auth(token),
            )
            .await;
        match result {
            Ok(response) => Ok(Some(response.json().await?)),
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Search users from the backend using pagination.
    pub async fn search_users(
        &self,
        token: &str,
        search: Option<&str>,
        page: i64,
        size: i64,
        sort: &str,
    ) -> AppResult<PageResponse<User>> {
        let mut params = vec![
            ("page", page.to_string()),
            ("size", size.to_string()),
            ("sort", sort.to_string()),
        ];
        if let Some(search) = search {
            params.push(("searchString", search.to_string()));
        }

        let response = self
            .execute(
                self.http
                    .get(self.url("/library/api/users"))
                    .query(&params)
                    .bearer_auth(token),
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Retrieve a user by username; an unknown username is not an error.
    pub async fn get_user(&self, token: &str, username: &str) -> AppResult<Option<User>> {
        let result = self
            .execute(
                self.http
                    .get(self.url(&format!("/library/api/users/{}", username)))
                    .bearer_auth(token),
            )
            .await;
        match result {
            Ok(response) => Ok(Some(response.json().await?)),
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// All loans of a user.
    pub async fn loans_of_user(&self, token: &str, username: &str) -> AppResult<Vec<Loan>> {
        let response = self
            .execute(
                self.http
                    .get(self.url(&format!("/library/api/users/{}/loans", username)))
                    .bearer_auth(token),
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Borrow a book for the user; the ISBN travels as the raw request body.
    pub async fn borrow_book(&self, token: &str, isbn: &str, username: &str) -> AppResult<Loan> {
        let response = self
            .execute(
                self.http
                    .post(self.url(&format!("/library/api/users/{}/loans", username)))
                    .body(isbn.to_string())
                    .bearer_auth(token),
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Return a borrowed book.
    pub async fn return_book(&self, token: &str, loan_id: i64, username: &str) -> AppResult<()> {
        self.execute(
            self.http
                .delete(self.url(&format!("/library/api/users/{}/loans/{}", username, loan_id)))
                .bearer_auth(token),
        )
        .await?;
        Ok(())
    }

    /// Create a user in the directory.
    pub async fn create_user(&self, token: &str, user: &User) -> AppResult<User> {
        let response = self
            .execute(
                self.http
                    .post(self.url("/library/api/users"))
                    .json(user)
                    .bearer_auth(token),
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Delete a user from the directory.
    pub async fn delete_user(&self, token: &str, username: &str) -> AppResult<()> {
        self.execute(
            self.http
                .delete(self.url(&format!("/library/api/users/{}", username)))
                .bearer_auth(token),
        )
        .await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Single call site for every outgoing backend request.
    async fn execute(&self, request: reqwest::RequestBuilder) -> AppResult<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(%status, url = %response.url(), "backend call");

        if status.is_success() {
            return Ok(response);
        }

        let body: BackendErrorBody = response.json().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => AppError::NotFound(body.message),
            StatusCode::CONFLICT => AppError::Conflict {
                message: if body.message.is_empty() {
                    "Conflict".to_string()
                } else {
                    body.message
                },
                hints: body.hints,
            },
            StatusCode::FORBIDDEN => AppError::Forbidden(body.message),
            StatusCode::UNAUTHORIZED => AppError::Unauthenticated,
            _ => AppError::Backend(format!("backend returned status {}", status)),
        })
    }
}
