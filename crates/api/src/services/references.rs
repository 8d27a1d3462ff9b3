//! Category/tag reverse-reference bookkeeping.
//!
//! Posts and products store `category_id` and `tag_ids`; categories and
//! tags mirror them in `post_ids`/`product_ids`. The two sides must
//! never diverge, so every mutation here takes a `&mut PgConnection`
//! and the caller runs the item write and the bookkeeping in one
//! transaction. Appends are guarded so a replayed statement cannot
//! duplicate an id.

use sqlx::PgConnection;
use uuid::Uuid;

use durian_core::{CategoryId, TagId};

use crate::db::RepositoryError;

/// Which owning collection an id belongs to, selecting the reverse
/// column on categories and tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Post,
    Product,
}

impl ItemKind {
    const fn reverse_column(self) -> &'static str {
        match self {
            Self::Post => "post_ids",
            Self::Product => "product_ids",
        }
    }
}

/// Splits a tag-set change into the appends and removals it implies.
/// Order within each list is unspecified; duplicates in the inputs are
/// collapsed.
#[must_use]
pub fn tag_diff(old: &[TagId], new: &[TagId]) -> (Vec<TagId>, Vec<TagId>) {
    let mut added: Vec<TagId> = Vec::new();
    for t in new {
        if !old.contains(t) && !added.contains(t) {
            added.push(*t);
        }
    }
    let mut removed: Vec<TagId> = Vec::new();
    for t in old {
        if !new.contains(t) && !removed.contains(t) {
            removed.push(*t);
        }
    }
    (added, removed)
}

/// Stateless helper owning the reverse-list SQL.
pub struct ReferenceService;

impl ReferenceService {
    /// Confirms the category exists before an item points at it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::MissingReference` if it does not.
    pub async fn ensure_category(
        conn: &mut PgConnection,
        category_id: CategoryId,
    ) -> Result<(), RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
                .bind(category_id)
                .fetch_one(conn)
                .await?;
        if !exists {
            return Err(RepositoryError::MissingReference(
                "Category not found.".to_owned(),
            ));
        }
        Ok(())
    }

    /// Confirms every tag exists before an item points at them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::MissingReference` if any is absent.
    pub async fn ensure_tags(
        conn: &mut PgConnection,
        tag_ids: &[TagId],
    ) -> Result<(), RepositoryError> {
        if tag_ids.is_empty() {
            return Ok(());
        }
        let found: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT id) FROM tags WHERE id = ANY($1)")
            .bind(tag_ids)
            .fetch_one(conn)
            .await?;
        let mut distinct = tag_ids.to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        if found != distinct.len() as i64 {
            return Err(RepositoryError::MissingReference(
                "Tag not found.".to_owned(),
            ));
        }
        Ok(())
    }

    /// Records a newly created item on its category and tags.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn attach(
        conn: &mut PgConnection,
        kind: ItemKind,
        item_id: Uuid,
        category_id: CategoryId,
        tag_ids: &[TagId],
    ) -> Result<(), RepositoryError> {
        Self::add_to_category(conn, kind, item_id, category_id).await?;
        Self::add_to_tags(conn, kind, item_id, tag_ids).await?;
        Ok(())
    }

    /// Erases a deleted item from its category and tags.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn detach(
        conn: &mut PgConnection,
        kind: ItemKind,
        item_id: Uuid,
        category_id: CategoryId,
        tag_ids: &[TagId],
    ) -> Result<(), RepositoryError> {
        Self::remove_from_category(conn, kind, item_id, category_id).await?;
        Self::remove_from_tags(conn, kind, item_id, tag_ids).await?;
        Ok(())
    }

    /// Moves an item's reverse entry from `old` to `new` when its
    /// category changes. A no-op when they match.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn move_category(
        conn: &mut PgConnection,
        kind: ItemKind,
        item_id: Uuid,
        old: CategoryId,
        new: CategoryId,
    ) -> Result<(), RepositoryError> {
        if old == new {
            return Ok(());
        }
        Self::remove_from_category(conn, kind, item_id, old).await?;
        Self::add_to_category(conn, kind, item_id, new).await?;
        Ok(())
    }

    /// Reconciles tag reverse entries after an item's tag set changes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn sync_tags(
        conn: &mut PgConnection,
        kind: ItemKind,
        item_id: Uuid,
        old: &[TagId],
        new: &[TagId],
    ) -> Result<(), RepositoryError> {
        let (added, removed) = tag_diff(old, new);
        Self::remove_from_tags(conn, kind, item_id, &removed).await?;
        Self::add_to_tags(conn, kind, item_id, &added).await?;
        Ok(())
    }

    async fn add_to_category(
        conn: &mut PgConnection,
        kind: ItemKind,
        item_id: Uuid,
        category_id: CategoryId,
    ) -> Result<(), RepositoryError> {
        let column = kind.reverse_column();
        let query = format!(
            "UPDATE categories
             SET {column} = array_append({column}, $2), updated_at = now()
             WHERE id = $1 AND NOT ($2 = ANY({column}))"
        );
        sqlx::query(&query)
            .bind(category_id)
            .bind(item_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn remove_from_category(
        conn: &mut PgConnection,
        kind: ItemKind,
        item_id: Uuid,
        category_id: CategoryId,
    ) -> Result<(), RepositoryError> {
        let column = kind.reverse_column();
        let query = format!(
            "UPDATE categories
             SET {column} = array_remove({column}, $2), updated_at = now()
             WHERE id = $1"
        );
        sqlx::query(&query)
            .bind(category_id)
            .bind(item_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn add_to_tags(
        conn: &mut PgConnection,
        kind: ItemKind,
        item_id: Uuid,
        tag_ids: &[TagId],
    ) -> Result<(), RepositoryError> {
        if tag_ids.is_empty() {
            return Ok(());
        }
        let column = kind.reverse_column();
        let query = format!(
            "UPDATE tags
             SET {column} = array_append({column}, $2), updated_at = now()
             WHERE id = ANY($1) AND NOT ($2 = ANY({column}))"
        );
        sqlx::query(&query)
            .bind(tag_ids)
            .bind(item_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn remove_from_tags(
        conn: &mut PgConnection,
        kind: ItemKind,
        item_id: Uuid,
        tag_ids: &[TagId],
    ) -> Result<(), RepositoryError> {
        if tag_ids.is_empty() {
            return Ok(());
        }
        let column = kind.reverse_column();
        let query = format!(
            "UPDATE tags
             SET {column} = array_remove({column}, $2), updated_at = now()
             WHERE id = ANY($1)"
        );
        sqlx::query(&query)
            .bind(tag_ids)
            .bind(item_id)
            .execute(conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(n: u8) -> TagId {
        TagId::new(Uuid::from_bytes([n; 16]))
    }

    #[test]
    fn tag_diff_splits_additions_and_removals() {
        let old = [tag(1), tag(2), tag(3)];
        let new = [tag(2), tag(3), tag(4)];
        let (added, removed) = tag_diff(&old, &new);
        assert_eq!(added, vec![tag(4)]);
        assert_eq!(removed, vec![tag(1)]);
    }

    #[test]
    fn tag_diff_of_equal_sets_is_empty() {
        let tags = [tag(1), tag(2)];
        let (added, removed) = tag_diff(&tags, &tags);
        assert!(added.is_empty());
        assert!(removed.is_empty());
    }

    #[test]
    fn tag_diff_handles_empty_sides() {
        let tags = [tag(7)];
        let (added, removed) = tag_diff(&[], &tags);
        assert_eq!(added, vec![tag(7)]);
        assert!(removed.is_empty());

        let (added, removed) = tag_diff(&tags, &[]);
        assert!(added.is_empty());
        assert_eq!(removed, vec![tag(7)]);
    }
}
