//! User directory service

use library_commons::model::{PageResponse, User};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{page::PageQuery, user::CreateUser},
    repository::Repository,
};

const DEFAULT_PAGE_SIZE: i64 = 10;
const DEFAULT_SORT: &str = "firstname";

#[derive(Clone)]
pub struct DirectoryService {
    repository: Repository,
}

impl DirectoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search users, paginated.
    pub async fn search_users(&self, query: &PageQuery) -> AppResult<PageResponse<User>> {
        let page = query.page.unwrap_or(0).max(0);
        let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);
        let sort = query.sort.as_deref().unwrap_or(DEFAULT_SORT);

        let (rows, total) = self
            .repository
            .users
            .search(query.search(), page, size, sort)
            .await?;

        Ok(PageResponse::new(
            rows.into_iter().map(User::from).collect(),
            page,
            size,
            total,
        ))
    }

    /// Get a single user by username.
    pub async fn get_user(&self, username: &str) -> AppResult<User> {
        let row = self.repository.users.get_by_username(username).await?;
        Ok(row.into())
    }

    /// Create a new user; collisions on username or email are conflicts.
    pub async fn create_user(&self, input: CreateUser) -> AppResult<User> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let row = self.repository.users.create(&input).await?;
        tracing::info!(username = %row.username, "user created");
        Ok(row.into())
    }

    /// Delete a user by username.
    pub async fn delete_user(&self, username: &str) -> AppResult<()> {
        self.repository.users.delete_by_username(username).await?;
        tracing::info!(username, "user deleted");
        Ok(())
    }
}
