//! Category repository.
//!
//! The `post_ids`/`product_ids` reverse lists are only read here; all
//! writes to them go through the reference service so both sides of the
//! link move in one transaction.

use sqlx::PgPool;

use durian_core::CategoryId;

use super::{Page, PageRequest, RepositoryError, conflict_on_unique, like_pattern};
use crate::models::Category;

const CATEGORY_COLUMNS: &str =
    "id, name, description, image, img_url, post_ids, product_ids, created_at, updated_at";

#[derive(Debug, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    /// `Some` when a replacement image was uploaded.
    pub image: Option<(String, String)>,
}

pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(
        &self,
        name: &str,
        description: &str,
        image: &str,
        img_url: &str,
    ) -> Result<Category, RepositoryError> {
        let query = format!(
            "INSERT INTO categories (id, name, description, image, img_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(CategoryId::generate())
            .bind(name)
            .bind(description)
            .bind(image)
            .bind(img_url)
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "Category name already exists."))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let query = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        Ok(sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepositoryError> {
        let query = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = $1");
        Ok(sqlx::query_as::<_, Category>(&query)
            .bind(name)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Paginated listing with optional search across name and
    /// description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        request: PageRequest,
    ) -> Result<Page<Category>, RepositoryError> {
        let filter = "WHERE ($1::text IS NULL OR name ILIKE $1 OR description ILIKE $1)";
        let pattern = search.map(like_pattern);

        let count_query = format!("SELECT COUNT(*) FROM categories {filter}");
        let total_rows: i64 = sqlx::query_scalar(&count_query)
            .bind(pattern.as_deref())
            .fetch_one(self.pool)
            .await?;

        let list_query = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories {filter}
             ORDER BY created_at ASC
             OFFSET $2 LIMIT $3"
        );
        let rows = sqlx::query_as::<_, Category>(&list_query)
            .bind(pattern.as_deref())
            .bind(request.offset())
            .bind(request.limit)
            .fetch_all(self.pool)
            .await?;

        Ok(Page::new(rows, request, total_rows))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist
    /// and `RepositoryError::Conflict` if the new name collides.
    pub async fn update(
        &self,
        id: CategoryId,
        changes: CategoryChanges,
    ) -> Result<Category, RepositoryError> {
        let (image, img_url) = match changes.image {
            Some((image, img_url)) => (Some(image), Some(img_url)),
            None => (None, None),
        };
        let query = format!(
            "UPDATE categories SET
                 name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 image = COALESCE($4, image),
                 img_url = COALESCE($5, img_url),
                 updated_at = now()
             WHERE id = $1
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(changes.name)
            .bind(changes.description)
            .bind(image)
            .bind(img_url)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "Category name already exists."))?
            .ok_or(RepositoryError::NotFound)
    }

    /// Counts posts and products currently referencing the category.
    /// The guard deliberately counts the owning rows, not the reverse
    /// list, so a diverged list cannot mask live references.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_references(&self, id: CategoryId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM posts WHERE category_id = $1)
                  + (SELECT COUNT(*) FROM products WHERE category_id = $1)",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not
    /// exist.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Batch fetch used when hydrating post/product category views.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_many(&self, ids: &[CategoryId]) -> Result<Vec<Category>, RepositoryError> {
        let query = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ANY($1)");
        Ok(sqlx::query_as::<_, Category>(&query)
            .bind(ids)
            .fetch_all(self.pool)
            .await?)
    }
}
