use chrono::{DateTime, Utc};
use serde::Serialize;

use durian_core::MenuId;

/// A navigation menu entry.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Menu {
    pub id: MenuId,
    pub name: String,
    pub link: String,
    pub icon: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
