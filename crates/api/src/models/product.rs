//! Product models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use durian_core::{CategoryId, ProductId, TagId, UserId};

use super::{AuthorView, CategoryRef, TagRef};

/// A product row as stored. Products are lookup-able by slug as well as
/// id; the slug is derived from the title on create and kept unique.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub image: String,
    #[serde(rename = "imgUrl")]
    pub img_url: String,
    #[serde(rename = "author")]
    pub author_id: UserId,
    #[serde(rename = "category")]
    pub category_id: CategoryId,
    #[serde(rename = "tags")]
    pub tag_ids: Vec<TagId>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// A product with its references resolved, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    pub id: ProductId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub image: String,
    #[serde(rename = "imgUrl")]
    pub img_url: String,
    pub author: Option<AuthorView>,
    pub category: Option<CategoryRef>,
    pub tags: Vec<TagRef>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl ProductDetail {
    #[must_use]
    pub fn assemble(
        product: Product,
        author: Option<AuthorView>,
        category: Option<CategoryRef>,
        tags: Vec<TagRef>,
    ) -> Self {
        Self {
            id: product.id,
            title: product.title,
            slug: product.slug,
            description: product.description,
            image: product.image,
            img_url: product.img_url,
            author,
            category,
            tags,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}
