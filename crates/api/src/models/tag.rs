//! Tag model with denormalized reverse references.

use chrono::{DateTime, Utc};
use serde::Serialize;

use durian_core::{PostId, ProductId, TagId};

/// A free-form label attachable to posts and products.
///
/// Carries the same reverse lists as [`super::Category`], with the same
/// consistency obligation.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    #[serde(rename = "posts")]
    pub post_ids: Vec<PostId>,
    #[serde(rename = "products")]
    pub product_ids: Vec<ProductId>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Trimmed tag view embedded in post/product detail responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TagRef {
    pub id: TagId,
    pub name: String,
}

impl From<&Tag> for TagRef {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name.clone(),
        }
    }
}
