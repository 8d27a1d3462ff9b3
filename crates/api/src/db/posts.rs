//! Post repository.
//!
//! Reads go through the pool. Writes that touch category/tag links take
//! a `&mut PgConnection` so the caller can run them in the same
//! transaction as the reverse-list bookkeeping.

use sqlx::{PgConnection, PgPool};

use durian_core::{CategoryId, PostId, TagId, UserId};

use super::{Page, PageRequest, RepositoryError, like_pattern};
use crate::models::Post;

const POST_COLUMNS: &str =
    "id, title, text, image, img_url, author_id, category_id, tag_ids, created_at, updated_at";

/// Search filter shared by the count and page queries: substring match
/// on the post's own text fields, or on the names of its author,
/// category, or any of its tags.
const POST_SEARCH_FILTER: &str = "WHERE ($1::text IS NULL
         OR title ILIKE $1 OR text ILIKE $1 OR image ILIKE $1
         OR author_id IN (SELECT id FROM users WHERE name ILIKE $1 OR username ILIKE $1)
         OR category_id IN (SELECT id FROM categories WHERE name ILIKE $1)
         OR tag_ids && ARRAY(SELECT id FROM tags WHERE name ILIKE $1))";

#[derive(Debug)]
pub struct NewPost {
    pub title: String,
    pub text: String,
    pub image: String,
    pub img_url: String,
    pub author_id: UserId,
    pub category_id: CategoryId,
    pub tag_ids: Vec<TagId>,
}

#[derive(Debug, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub text: Option<String>,
    /// `Some` when a replacement image was uploaded.
    pub image: Option<(String, String)>,
    pub category_id: Option<CategoryId>,
    pub tag_ids: Option<Vec<TagId>>,
}

pub struct PostRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PostRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepositoryError> {
        let query = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        Ok(sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Paginated listing with optional search. See
    /// [`POST_SEARCH_FILTER`] for the matched fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        request: PageRequest,
    ) -> Result<Page<Post>, RepositoryError> {
        let pattern = search.map(like_pattern);

        let count_query = format!("SELECT COUNT(*) FROM posts {POST_SEARCH_FILTER}");
        let total_rows: i64 = sqlx::query_scalar(&count_query)
            .bind(pattern.as_deref())
            .fetch_one(self.pool)
            .await?;

        let list_query = format!(
            "SELECT {POST_COLUMNS} FROM posts {POST_SEARCH_FILTER}
             ORDER BY created_at DESC
             OFFSET $2 LIMIT $3"
        );
        let rows = sqlx::query_as::<_, Post>(&list_query)
            .bind(pattern.as_deref())
            .bind(request.offset())
            .bind(request.limit)
            .fetch_all(self.pool)
            .await?;

        Ok(Page::new(rows, request, total_rows))
    }

    /// Paginated listing of posts in one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
        request: PageRequest,
    ) -> Result<Page<Post>, RepositoryError> {
        let total_rows: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE category_id = $1")
                .bind(category_id)
                .fetch_one(self.pool)
                .await?;

        let list_query = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE category_id = $1
             ORDER BY created_at DESC
             OFFSET $2 LIMIT $3"
        );
        let rows = sqlx::query_as::<_, Post>(&list_query)
            .bind(category_id)
            .bind(request.offset())
            .bind(request.limit)
            .fetch_all(self.pool)
            .await?;

        Ok(Page::new(rows, request, total_rows))
    }

    /// Inserts a post inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(conn: &mut PgConnection, new: NewPost) -> Result<Post, RepositoryError> {
        let query = format!(
            "INSERT INTO posts (id, title, text, image, img_url, author_id, category_id, tag_ids)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {POST_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Post>(&query)
            .bind(PostId::generate())
            .bind(new.title)
            .bind(new.text)
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
    /// Returns `RepositoryError::NotFound` if the post does not exist.
    pub async fn update(
        conn: &mut PgConnection,
        id: PostId,
        changes: PostChanges,
    ) -> Result<Post, RepositoryError> {
        let (image, img_url) = match changes.image {
            Some((image, img_url)) => (Some(image), Some(img_url)),
            None => (None, None),
        };
        let query = format!(
            "UPDATE posts SET
                 title = COALESCE($2, title),
                 text = COALESCE($3, text),
                 image = COALESCE($4, image),
                 img_url = COALESCE($5, img_url),
                 category_id = COALESCE($6, category_id),
                 tag_ids = COALESCE($7, tag_ids),
                 updated_at = now()
             WHERE id = $1
             RETURNING {POST_COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(changes.title)
            .bind(changes.text)
            .bind(image)
            .bind(img_url)
            .bind(changes.category_id)
            .bind(changes.tag_ids)
            .fetch_optional(conn)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Deletes a post inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post does not exist.
    pub async fn delete(conn: &mut PgConnection, id: PostId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
