use chrono::{DateTime, Utc};
use serde::Serialize;

use durian_core::SeoEntryId;

/// A keyword/description pair surfaced in page metadata.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SeoEntry {
    pub id: SeoEntryId,
    pub keyword: String,
    pub description: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
