//! Visitor analytics. The data comes from the tracking layer in
//! [`crate::middleware::visits`]; this endpoint only aggregates it.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Deserialize;

use crate::db::VisitRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::DailyVisits;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates.
fn parse_date(raw: &str, end_of_day: bool, message: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    let date: NaiveDate = raw
        .parse()
        .map_err(|_| AppError::Validation(message.to_owned()))?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    // and_hms_opt only fails on out-of-range components; these are fixed.
    time.map(|t| t.and_utc())
        .ok_or_else(|| AppError::Validation(message.to_owned()))
}

/// Visits per day over the requested range, defaulting to the last 30
/// days.
///
/// GET /visitors (requires auth)
///
/// # Errors
///
/// Returns 400 for an unparseable date.
pub async fn daily(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<DailyVisits>>, AppError> {
    let end = match query.end_date.as_deref() {
        Some(raw) => parse_date(raw, true, "End date is not valid.")?,
        None => Utc::now(),
    };
    let start = match query.start_date.as_deref() {
        Some(raw) => parse_date(raw, false, "Start date is not valid.")?,
        None => end - Duration::days(30),
    };

    let counts = VisitRepository::new(state.pool())
        .daily_counts(start, end)
        .await?;
    Ok(Json(counts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bare_dates() {
        let start = parse_date("2026-01-05", false, "bad").unwrap();
        assert_eq!(start.to_rfc3339(), "2026-01-05T00:00:00+00:00");
        let end = parse_date("2026-01-05", true, "bad").unwrap();
        assert_eq!(end.to_rfc3339(), "2026-01-05T23:59:59+00:00");
    }

    #[test]
    fn accepts_rfc3339_timestamps() {
        let parsed = parse_date("2026-01-05T08:30:00+07:00", false, "bad").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-01-05T01:30:00+00:00");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_date("last tuesday", false, "bad").is_err());
    }
}
