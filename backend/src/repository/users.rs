//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UserRow},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Map the requested sort field to a column; unknown fields sort by first name.
    fn sort_column(sort: &str) -> &'static str {
        match sort {
            "username" => "username",
            "lastname" | "last_name" => "last_name",
            "email" => "email",
            _ => "first_name",
        }
    }

    /// Search users, paginated.
    ///
    /// The free-text filter matches username, first name, last name or email
    /// as a case-insensitive substring.
    pub async fn search(
        &self,
        search: Option<&str>,
        page: i64,
        size: i64,
        sort: &str,
    ) -> AppResult<(Vec<UserRow>, i64)> {
        let pattern = search.map(|s| format!("%{}%", s.to_lowercase()));
        let offset = page * size;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM users
            WHERE ($1::text IS NULL
                OR LOWER(username) LIKE $1
                OR LOWER(first_name) LIKE $1
                OR LOWER(last_name) LIKE $1
                OR LOWER(email) LIKE $1)
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let query = format!(
            r#"
            SELECT id, username, first_name, last_name, email
            FROM users
            WHERE ($1::text IS NULL
                OR LOWER(username) LIKE $1
                OR LOWER(first_name) LIKE $1
                OR LOWER(last_name) LIKE $1
                OR LOWER(email) LIKE $1)
            ORDER BY {}
            LIMIT $2 OFFSET $3
            "#,
            Self::sort_column(sort)
        );

        let rows = sqlx::query_as::<_, UserRow>(&query)
            .bind(&pattern)
            .bind(size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> AppResult<UserRow> {
        self.find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", username)))
    }

    /// Look up a user by username without treating absence as an error.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, first_name, last_name, email FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Create a new user.
    ///
    /// Username and email uniqueness are checked independently inside the
    /// insert transaction so the conflict can name every colliding field.
    pub async fn create(&self, user: &CreateUser) -> AppResult<UserRow> {
        let mut tx = self.pool.begin().await?;

        let username_taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(&user.username)
                .fetch_one(&mut *tx)
                .await?;
        let email_taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(&user.email)
                .fetch_one(&mut *tx)
                .await?;

        if username_taken || email_taken {
            let mut hints = Vec::new();
            if username_taken {
                hints.push("username");
            }
            if email_taken {
                hints.push("email");
            }
            return Err(AppError::Conflict {
                message: "User already exists".to_string(),
                hints,
            });
        }

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, first_name, last_name, email)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, first_name, last_name, email
            "#,
        )
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            // a concurrent insert can still win the race
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                let hints = match db.constraint() {
                    Some("users_username_key") => vec!["username"],
                    Some("users_email_key") => vec!["email"],
                    _ => Vec::new(),
                };
                AppError::Conflict {
                    message: "User already exists".to_string(),
                    hints,
                }
            }
            other => AppError::Database(other),
        })?;

        tx.commit().await?;
        Ok(row)
    }

    /// Delete a user by username.
    ///
    /// Deleting an unknown username is a no-op; deleting a user with an open
    /// loan is rejected. Closed-loan history keeps the bare user id.
    pub async fn delete_by_username(&self, username: &str) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, first_name, last_name, email FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user) = user else {
            return Ok(());
        };

        let open_loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE user_id = $1 AND returned_at IS NULL",
        )
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await?;

        if open_loans > 0 {
            return Err(AppError::conflict(format!(
                "User {} has {} open loan(s)",
                username, open_loans
            )));
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_fields_are_whitelisted() {
        assert_eq!(UsersRepository::sort_column("username"), "username");
        assert_eq!(UsersRepository::sort_column("lastname"), "last_name");
        assert_eq!(UsersRepository::sort_column("firstname"), "first_name");
        assert_eq!(UsersRepository::sort_column("anything else"), "first_name");
    }
}
