//! Visit log repository: append-only writes from the tracking
//! middleware plus the per-day aggregation behind the analytics
//! endpoint.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use durian_core::VisitId;

use super::RepositoryError;
use crate::models::DailyVisits;

pub struct VisitRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VisitRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Appends one page view.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record(&self, page: &str, ip_address: Option<&str>) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO visits (id, page, ip_address) VALUES ($1, $2, $3)")
            .bind(VisitId::generate())
            .bind(page)
            .bind(ip_address)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Visits per calendar day over `[start, end]`, ascending. Dates are
    /// rendered `day/month/year` to match the reporting frontend.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn daily_counts(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DailyVisits>, RepositoryError> {
        let rows = sqlx::query_as::<_, DailyVisits>(
            "SELECT to_char(visited_at AT TIME ZONE 'UTC', 'FMDD/FMMM/YYYY') AS date,
                    COUNT(*) AS count
             FROM visits
             WHERE visited_at >= $1 AND visited_at <= $2
             GROUP BY date_trunc('day', visited_at AT TIME ZONE 'UTC'), date
             ORDER BY date_trunc('day', visited_at AT TIME ZONE 'UTC')",
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
