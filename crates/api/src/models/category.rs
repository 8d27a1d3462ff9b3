//! Category model with denormalized reverse references.

use chrono::{DateTime, Utc};
use serde::Serialize;

use durian_core::{CategoryId, PostId, ProductId};

/// A content/product category.
///
/// `post_ids` and `product_ids` are the reverse lists: every post/product
/// whose `category` field points here must appear in the matching array.
/// The deletion guard counts live rows, not these arrays, so the two must
/// never diverge.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub image: String,
    pub img_url: String,
    #[serde(rename = "posts")]
    pub post_ids: Vec<PostId>,
    #[serde(rename = "products")]
    pub product_ids: Vec<ProductId>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Trimmed category view embedded in post/product detail responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub image: String,
    pub img_url: String,
}

impl From<&Category> for CategoryRef {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            description: category.description.clone(),
            image: category.image.clone(),
            img_url: category.img_url.clone(),
        }
    }
}
