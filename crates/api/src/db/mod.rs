//! Database operations for the `PostgreSQL` backing store.
//!
//! ## Tables
//!
//! - `users` - Accounts with verification/refresh/reset token columns
//! - `categories`, `tags` - Reference data with denormalized reverse
//!   lists (`post_ids`/`product_ids`) maintained by the services layer
//! - `posts`, `products` - Authored content referencing the above
//! - `about`, `contact`, `logo`, `site_config` - Singleton rows
//! - `banners`, `carousels`, `menus`, `seo_entries` - Small collections
//! - `visits` - Append-only page-view log
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and run automatically at
//! startup via `sqlx::migrate!`.

pub mod categories;
pub mod media;
pub mod menus;
pub mod posts;
pub mod products;
pub mod seo;
pub mod tags;
pub mod users;
pub mod visits;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::{CategoryChanges, CategoryRepository};
pub use media::{
    AboutContent, BannerChanges, CarouselChanges, ContactContent, MediaRepository,
    SiteConfigChanges,
};
pub use menus::{MenuChanges, MenuRepository};
pub use posts::{NewPost, PostChanges, PostRepository};
pub use products::{NewProduct, ProductChanges, ProductRepository};
pub use seo::SeoRepository;
pub use tags::TagRepository;
pub use users::{UserChanges, UserRepository};
pub use visits::VisitRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique name).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A referenced entity (category, tag, author) does not exist. The
    /// message names the missing reference for the client.
    #[error("missing reference: {0}")]
    MissingReference(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Normalized pagination parameters for list queries.
///
/// Pages are zero-based; `offset` is `page * limit`.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Clamps raw query-string values into a usable request. Negative or
    /// zero limits fall back to `default_limit`.
    #[must_use]
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        let page = page.unwrap_or(0).max(0);
        let limit = match limit {
            Some(l) if l > 0 => l,
            _ => default_limit,
        };
        Self { page, limit }
    }

    #[must_use]
    pub const fn offset(&self) -> i64 {
        self.page * self.limit
    }

    /// Total page count for `total_rows` rows at this limit, rounded up.
    #[must_use]
    pub const fn total_pages(&self, total_rows: i64) -> i64 {
        // i64::div_ceil is unstable (int_roundings); this is its exact expansion.
        let d = total_rows / self.limit;
        let r = total_rows % self.limit;
        if (r > 0 && self.limit > 0) || (r < 0 && self.limit < 0) {
            d + 1
        } else {
            d
        }
    }
}

/// A page of rows plus the counters the list endpoints report.
#[derive(Debug)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub page: i64,
    pub total_rows: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(rows: Vec<T>, request: PageRequest, total_rows: i64) -> Self {
        Self {
            rows,
            page: request.page,
            total_rows,
            total_pages: request.total_pages(total_rows),
        }
    }

    /// Maps row type while keeping the counters.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            rows: self.rows.into_iter().map(f).collect(),
            page: self.page,
            total_rows: self.total_rows,
            total_pages: self.total_pages,
        }
    }
}

/// Collapses a unique-constraint violation into a `Conflict` carrying
/// the client-facing message; other errors pass through as `Database`.
pub(crate) fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

/// Builds a `%term%` pattern for `ILIKE`, escaping the wildcard
/// metacharacters in the user's term so they match literally.
#[must_use]
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_defaults_apply() {
        let req = PageRequest::new(None, None, 10);
        assert_eq!(req.page, 0);
        assert_eq!(req.limit, 10);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn page_request_rejects_negative_values() {
        let req = PageRequest::new(Some(-3), Some(0), 32);
        assert_eq!(req.page, 0);
        assert_eq!(req.limit, 32);
    }

    #[test]
    fn offset_is_page_times_limit() {
        let req = PageRequest::new(Some(3), Some(10), 10);
        assert_eq!(req.offset(), 30);
    }

    #[test]
    fn total_pages_rounds_up() {
        let req = PageRequest::new(Some(0), Some(10), 10);
        assert_eq!(req.total_pages(0), 0);
        assert_eq!(req.total_pages(10), 1);
        assert_eq!(req.total_pages(11), 2);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("dur"), "%dur%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
