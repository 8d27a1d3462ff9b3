//! User repository.
//!
//! Queries use runtime-checked `query_as` with `FromRow` models so the
//! crate builds without a live database.

use sqlx::PgPool;

use durian_core::{Email, UserId};

use super::{Page, PageRequest, RepositoryError, conflict_on_unique, like_pattern};
use crate::models::User;

const USER_COLUMNS: &str = "id, name, username, email, password_hash, is_verified, \
     email_token, reset_token, refresh_token, created_at, updated_at";

/// Patch applied by `update`; `None` fields are left untouched.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<Email>,
    pub password_hash: Option<String>,
}

/// Repository for user accounts and their stored tokens.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new, unverified account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email is
    /// already taken, `RepositoryError::Database` otherwise.
    pub async fn create(
        &self,
        name: &str,
        username: &str,
        email: &Email,
        password_hash: &str,
        email_token: &str,
    ) -> Result<User, RepositoryError> {
        let query = format!(
            "INSERT INTO users (id, name, username, email, password_hash, email_token)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(UserId::generate())
            .bind(name)
            .bind(username)
            .bind(email.as_str())
            .bind(password_hash)
            .bind(email_token)
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "Username or email is already registered."))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?)
    }

    /// Looks up the holder of a stored refresh token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_refresh_token(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE refresh_token = $1");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(token)
            .fetch_optional(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_email_token(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email_token = $1");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(token)
            .fetch_optional(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_reset_token(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE reset_token = $1");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(token)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Paginated listing with optional case-insensitive search across
    /// name, username, and email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        request: PageRequest,
    ) -> Result<Page<User>, RepositoryError> {
        let filter = "WHERE ($1::text IS NULL \
             OR name ILIKE $1 OR username ILIKE $1 OR email ILIKE $1)";
        let pattern = search.map(like_pattern);

        let count_query = format!("SELECT COUNT(*) FROM users {filter}");
        let total_rows: i64 = sqlx::query_scalar(&count_query)
            .bind(pattern.as_deref())
            .fetch_one(self.pool)
            .await?;

        let list_query = format!(
            "SELECT {USER_COLUMNS} FROM users {filter}
             ORDER BY name ASC
             OFFSET $2 LIMIT $3"
        );
        let rows = sqlx::query_as::<_, User>(&list_query)
            .bind(pattern.as_deref())
            .bind(request.offset())
            .bind(request.limit)
            .fetch_all(self.pool)
            .await?;

        Ok(Page::new(rows, request, total_rows))
    }

    /// Applies a partial update to an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist and
    /// `RepositoryError::Conflict` if the new username or email collides
    /// with another account.
    pub async fn update(&self, id: UserId, changes: UserChanges) -> Result<User, RepositoryError> {
        let query = format!(
            "UPDATE users SET
                 name = COALESCE($2, name),
                 username = COALESCE($3, username),
                 email = COALESCE($4, email),
                 password_hash = COALESCE($5, password_hash),
                 updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(changes.name)
            .bind(changes.username)
            .bind(changes.email.map(Email::into_inner))
            .bind(changes.password_hash)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "Username or email is already registered."))?
            .ok_or(RepositoryError::NotFound)
    }

    /// Stores the refresh token issued at login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn set_refresh_token(&self, id: UserId, token: &str) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET refresh_token = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(token)
                .execute(self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Clears a stored refresh token at logout. Succeeds silently when no
    /// account holds the token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_refresh_token(&self, token: &str) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET refresh_token = NULL, updated_at = now() WHERE refresh_token = $1")
            .bind(token)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Flips the verification flag and consumes the email token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn mark_verified(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET is_verified = TRUE, email_token = NULL, updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Replaces the pending email-verification token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn set_email_token(&self, id: UserId, token: &str) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET email_token = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(token)
                .execute(self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Stores a pending password-reset token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn set_reset_token(&self, id: UserId, token: &str) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET reset_token = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(token)
                .execute(self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Sets a new password hash and consumes the reset token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn reset_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, reset_token = NULL, updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Counts posts and products authored by the user. Deletion is
    /// refused while this is non-zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_authored(&self, id: UserId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM posts WHERE author_id = $1)
                  + (SELECT COUNT(*) FROM products WHERE author_id = $1)",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Batch fetch used when hydrating post/product author views.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(ids)
            .fetch_all(self.pool)
            .await?)
    }
}
