use serde::Serialize;

/// Aggregated visit count for a single calendar day.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailyVisits {
    pub date: String,
    pub count: i64,
}
