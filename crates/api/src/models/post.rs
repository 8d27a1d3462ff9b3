//! Post (article) models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use durian_core::{CategoryId, PostId, TagId, UserId};

use super::{AuthorView, CategoryRef, TagRef};

/// A post row as stored. Foreign keys are kept as raw ids; handlers that
/// need populated references build a [`PostDetail`] instead.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub text: String,
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

/// A post with its author, category, and tags resolved into embedded
/// objects. This is the shape list and single-item endpoints return.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub id: PostId,
    pub title: String,
    pub text: String,
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

impl PostDetail {
    /// Assembles a detail view from a row and its resolved references.
    /// `author` and `category` are optional so a dangling reference
    /// degrades to `null` rather than failing the whole listing.
    #[must_use]
    pub fn assemble(
        post: Post,
        author: Option<AuthorView>,
        category: Option<CategoryRef>,
        tags: Vec<TagRef>,
    ) -> Self {
        Self {
            id: post.id,
            title: post.title,
            text: post.text,
            image: post.image,
            img_url: post.img_url,
            author,
            category,
            tags,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}
