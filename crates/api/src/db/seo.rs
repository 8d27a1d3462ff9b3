//! SEO metadata repository.

use sqlx::PgPool;

use durian_core::SeoEntryId;

use super::{Page, PageRequest, RepositoryError, like_pattern};
use crate::models::SeoEntry;

const SEO_COLUMNS: &str = "id, keyword, description, created_at, updated_at";

pub struct SeoRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SeoRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        request: PageRequest,
    ) -> Result<Page<SeoEntry>, RepositoryError> {
        let filter = "WHERE ($1::text IS NULL OR keyword ILIKE $1 OR description ILIKE $1)";
        let pattern = search.map(like_pattern);

        let count_query = format!("SELECT COUNT(*) FROM seo_entries {filter}");
        let total_rows: i64 = sqlx::query_scalar(&count_query)
            .bind(pattern.as_deref())
            .fetch_one(self.pool)
            .await?;

        let list_query = format!(
            "SELECT {SEO_COLUMNS} FROM seo_entries {filter}
             ORDER BY created_at DESC
             OFFSET $2 LIMIT $3"
        );
        let rows = sqlx::query_as::<_, SeoEntry>(&list_query)
            .bind(pattern.as_deref())
            .bind(request.offset())
            .bind(request.limit)
            .fetch_all(self.pool)
            .await?;

        Ok(Page::new(rows, request, total_rows))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: SeoEntryId) -> Result<Option<SeoEntry>, RepositoryError> {
        let query = format!("SELECT {SEO_COLUMNS} FROM seo_entries WHERE id = $1");
        Ok(sqlx::query_as::<_, SeoEntry>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, keyword: &str, description: &str) -> Result<SeoEntry, RepositoryError> {
        let query = format!(
            "INSERT INTO seo_entries (id, keyword, description)
             VALUES ($1, $2, $3)
             RETURNING {SEO_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, SeoEntry>(&query)
            .bind(SeoEntryId::generate())
            .bind(keyword)
            .bind(description)
            .fetch_one(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry does not exist.
    pub async fn update(
        &self,
        id: SeoEntryId,
        keyword: &str,
        description: &str,
    ) -> Result<SeoEntry, RepositoryError> {
        let query = format!(
            "UPDATE seo_entries SET keyword = $2, description = $3, updated_at = now()
             WHERE id = $1
             RETURNING {SEO_COLUMNS}"
        );
        sqlx::query_as::<_, SeoEntry>(&query)
            .bind(id)
            .bind(keyword)
            .bind(description)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry does not exist.
    pub async fn delete(&self, id: SeoEntryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM seo_entries WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
