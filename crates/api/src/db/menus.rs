//! Navigation menu repository.

use sqlx::PgPool;

use durian_core::MenuId;

use super::{Page, PageRequest, RepositoryError, like_pattern};
use crate::models::Menu;

const MENU_COLUMNS: &str = "id, name, link, icon, created_at, updated_at";

#[derive(Debug, Default)]
pub struct MenuChanges {
    pub name: Option<String>,
    pub link: Option<String>,
    pub icon: Option<String>,
}

pub struct MenuRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MenuRepository<'a> {
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
    ) -> Result<Page<Menu>, RepositoryError> {
        let filter = "WHERE ($1::text IS NULL OR name ILIKE $1 OR link ILIKE $1)";
        let pattern = search.map(like_pattern);

        let count_query = format!("SELECT COUNT(*) FROM menus {filter}");
        let total_rows: i64 = sqlx::query_scalar(&count_query)
            .bind(pattern.as_deref())
            .fetch_one(self.pool)
            .await?;

        let list_query = format!(
            "SELECT {MENU_COLUMNS} FROM menus {filter}
             ORDER BY created_at ASC
             OFFSET $2 LIMIT $3"
        );
        let rows = sqlx::query_as::<_, Menu>(&list_query)
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
    pub async fn find_by_id(&self, id: MenuId) -> Result<Option<Menu>, RepositoryError> {
        let query = format!("SELECT {MENU_COLUMNS} FROM menus WHERE id = $1");
        Ok(sqlx::query_as::<_, Menu>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        name: &str,
        link: &str,
        icon: Option<&str>,
    ) -> Result<Menu, RepositoryError> {
        let query = format!(
            "INSERT INTO menus (id, name, link, icon)
             VALUES ($1, $2, $3, $4)
             RETURNING {MENU_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Menu>(&query)
            .bind(MenuId::generate())
            .bind(name)
            .bind(link)
            .bind(icon)
            .fetch_one(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the menu does not exist.
    pub async fn update(&self, id: MenuId, changes: MenuChanges) -> Result<Menu, RepositoryError> {
        let query = format!(
            "UPDATE menus SET
                 name = COALESCE($2, name),
                 link = COALESCE($3, link),
                 icon = COALESCE($4, icon),
                 updated_at = now()
             WHERE id = $1
             RETURNING {MENU_COLUMNS}"
        );
        sqlx::query_as::<_, Menu>(&query)
            .bind(id)
            .bind(changes.name)
            .bind(changes.link)
            .bind(changes.icon)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the menu does not exist.
    pub async fn delete(&self, id: MenuId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
