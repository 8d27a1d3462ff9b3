//! Product repository.
//!
//! Same transaction split as posts; additionally owns slug assignment,
//! which appends `-2`, `-3`, ... when the slugified title collides.

use sqlx::{PgConnection, PgPool};

use durian_core::{CategoryId, ProductId, TagId, UserId, slugify};

use super::{Page, PageRequest, RepositoryError, like_pattern};
use crate::models::Product;

const PRODUCT_COLUMNS: &str = "id, title, slug, description, image, img_url, author_id, \
     category_id, tag_ids, created_at, updated_at";

const PRODUCT_SEARCH_FILTER: &str = "WHERE ($1::text IS NULL
         OR title ILIKE $1 OR description ILIKE $1 OR image ILIKE $1
         OR author_id IN (SELECT id FROM users WHERE name ILIKE $1 OR username ILIKE $1)
         OR category_id IN (SELECT id FROM categories WHERE name ILIKE $1)
         OR tag_ids && ARRAY(SELECT id FROM tags WHERE name ILIKE $1))";

#[derive(Debug)]
pub struct NewProduct {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub image: String,
    pub img_url: String,
    pub author_id: UserId,
    pub category_id: CategoryId,
    pub tag_ids: Vec<TagId>,
}

#[derive(Debug, Default)]
pub struct ProductChanges {
    pub title: Option<String>,
    /// Recomputed by the caller when the title changes.
    pub slug: Option<String>,
    pub description: Option<String>,
    /// `Some` when a replacement image was uploaded.
    pub image: Option<(String, String)>,
    pub category_id: Option<CategoryId>,
    pub tag_ids: Option<Vec<TagId>>,
}

pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        Ok(sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE slug = $1");
        Ok(sqlx::query_as::<_, Product>(&query)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Paginated listing with optional search across the product's text
    /// fields and the names of its author, category, and tags.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        request: PageRequest,
    ) -> Result<Page<Product>, RepositoryError> {
        let pattern = search.map(like_pattern);

        let count_query = format!("SELECT COUNT(*) FROM products {PRODUCT_SEARCH_FILTER}");
        let total_rows: i64 = sqlx::query_scalar(&count_query)
            .bind(pattern.as_deref())
            .fetch_one(self.pool)
            .await?;

        let list_query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products {PRODUCT_SEARCH_FILTER}
             ORDER BY created_at DESC
             OFFSET $2 LIMIT $3"
        );
        let rows = sqlx::query_as::<_, Product>(&list_query)
            .bind(pattern.as_deref())
            .bind(request.offset())
            .bind(request.limit)
            .fetch_all(self.pool)
            .await?;

        Ok(Page::new(rows, request, total_rows))
    }

    /// Paginated listing of products in one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
        request: PageRequest,
    ) -> Result<Page<Product>, RepositoryError> {
        let total_rows: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = $1")
                .bind(category_id)
                .fetch_one(self.pool)
                .await?;

        let list_query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE category_id = $1
             ORDER BY created_at DESC
             OFFSET $2 LIMIT $3"
        );
        let rows = sqlx::query_as::<_, Product>(&list_query)
            .bind(category_id)
            .bind(request.offset())
            .bind(request.limit)
            .fetch_all(self.pool)
            .await?;

        Ok(Page::new(rows, request, total_rows))
    }

    /// Derives a slug from `title` that no other product holds. `exclude`
    /// keeps a product's own slug valid during an update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn unique_slug(
        &self,
        title: &str,
        exclude: Option<ProductId>,
    ) -> Result<String, RepositoryError> {
        let base = slugify(title);
        let taken: Vec<String> = sqlx::query_scalar(
            "SELECT slug FROM products
             WHERE (slug = $1 OR slug LIKE $1 || '-%') AND ($2::uuid IS NULL OR id <> $2)",
        )
        .bind(&base)
        .bind(exclude)
        .fetch_all(self.pool)
        .await?;

        if !taken.iter().any(|s| s == &base) {
            return Ok(base);
        }
        let mut n = 2u32;
        loop {
            let candidate = format!("{base}-{n}");
            if !taken.iter().any(|s| s == &candidate) {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// Inserts a product inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        conn: &mut PgConnection,
        new: NewProduct,
    ) -> Result<Product, RepositoryError> {
        let query = format!(
            "INSERT INTO products
                 (id, title, slug, description, image, img_url, author_id, category_id, tag_ids)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {PRODUCT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Product>(&query)
            .bind(ProductId::generate())
            .bind(new.title)
            .bind(new.slug)
            .bind(new.description)
            .bind(new.image)
            .bind(new.img_url)
            .bind(new.author_id)
            .bind(new.category_id)
            .bind(new.tag_ids)
            .fetch_one(conn)
            .await?)
    }

    /// Applies a partial update inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(
        conn: &mut PgConnection,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Product, RepositoryError> {
        let (image, img_url) = match changes.image {
            Some((image, img_url)) => (Some(image), Some(img_url)),
            None => (None, None),
        };
        let query = format!(
            "UPDATE products SET
                 title = COALESCE($2, title),
                 slug = COALESCE($3, slug),
                 description = COALESCE($4, description),
                 image = COALESCE($5, image),
                 img_url = COALESCE($6, img_url),
                 category_id = COALESCE($7, category_id),
                 tag_ids = COALESCE($8, tag_ids),
                 updated_at = now()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(changes.title)
            .bind(changes.slug)
            .bind(changes.description)
            .bind(image)
            .bind(img_url)
            .bind(changes.category_id)
            .bind(changes.tag_ids)
            .fetch_optional(conn)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Deletes a product inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(conn: &mut PgConnection, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
