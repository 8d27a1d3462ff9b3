//! Tag repository. Reverse-list writes go through the reference
//! service, same as categories.

use sqlx::PgPool;

use durian_core::TagId;

use super::{Page, PageRequest, RepositoryError, conflict_on_unique, like_pattern};
use crate::models::Tag;

const TAG_COLUMNS: &str = "id, name, post_ids, product_ids, created_at, updated_at";

pub struct TagRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TagRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(&self, name: &str) -> Result<Tag, RepositoryError> {
        let query = format!(
            "INSERT INTO tags (id, name) VALUES ($1, $2) RETURNING {TAG_COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(TagId::generate())
            .bind(name)
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "Tag name already exists."))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: TagId) -> Result<Option<Tag>, RepositoryError> {
        let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = $1");
        Ok(sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, RepositoryError> {
        let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE name = $1");
        Ok(sqlx::query_as::<_, Tag>(&query)
            .bind(name)
            .fetch_optional(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        request: PageRequest,
    ) -> Result<Page<Tag>, RepositoryError> {
        let filter = "WHERE ($1::text IS NULL OR name ILIKE $1)";
        let pattern = search.map(like_pattern);

        let count_query = format!("SELECT COUNT(*) FROM tags {filter}");
        let total_rows: i64 = sqlx::query_scalar(&count_query)
            .bind(pattern.as_deref())
            .fetch_one(self.pool)
            .await?;

        let list_query = format!(
            "SELECT {TAG_COLUMNS} FROM tags {filter}
             ORDER BY created_at ASC
             OFFSET $2 LIMIT $3"
        );
        let rows = sqlx::query_as::<_, Tag>(&list_query)
            .bind(pattern.as_deref())
            .bind(request.offset())
            .bind(request.limit)
            .fetch_all(self.pool)
            .await?;

        Ok(Page::new(rows, request, total_rows))
    }

    /// Renames a tag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the tag does not exist and
    /// `RepositoryError::Conflict` if the new name collides.
    pub async fn update(&self, id: TagId, name: &str) -> Result<Tag, RepositoryError> {
        let query = format!(
            "UPDATE tags SET name = $2, updated_at = now()
             WHERE id = $1
             RETURNING {TAG_COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "Tag name already exists."))?
            .ok_or(RepositoryError::NotFound)
    }

    /// Counts posts and products currently carrying the tag. Checked
    /// against the owning rows, not the reverse list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_references(&self, id: TagId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM posts WHERE $1 = ANY(tag_ids))
                  + (SELECT COUNT(*) FROM products WHERE $1 = ANY(tag_ids))",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the tag does not exist.
    pub async fn delete(&self, id: TagId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Batch fetch used when hydrating post/product tag views.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_many(&self, ids: &[TagId]) -> Result<Vec<Tag>, RepositoryError> {
        let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = ANY($1)");
        Ok(sqlx::query_as::<_, Tag>(&query)
            .bind(ids)
            .fetch_all(self.pool)
            .await?)
    }
}
