//! Blog post routes.
//!
//! Mutations run the reverse-reference bookkeeping (category and tag
//! membership lists) in the same transaction as the row change, so a
//! failure midway leaves no half-linked post behind.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Response,
};
use durian_core::{CategoryId, PostId, TagId, UserId};

use crate::db::{
    CategoryRepository, NewPost, Page, PostChanges, PostRepository, TagRepository, UserRepository,
};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{AuthorView, CategoryRef, Post, PostDetail, TagRef};
use crate::services::{ImageStore, ItemKind, ReferenceService, UploadKind, ValidatedUpload};
use crate::state::AppState;

use super::forms::{FormData, parse_id, parse_ids};
use super::{ListQuery, list_response, message_response};

/// Batch-resolves authors, categories, and tags for a page of posts.
pub(super) async fn hydrate(
    state: &AppState,
    posts: Vec<Post>,
) -> Result<Vec<PostDetail>, AppError> {
    let author_ids: Vec<UserId> = posts.iter().map(|p| p.author_id).collect();
    let category_ids: Vec<CategoryId> = posts.iter().map(|p| p.category_id).collect();
    let tag_ids: Vec<TagId> = posts.iter().flat_map(|p| p.tag_ids.clone()).collect();

    let authors: HashMap<UserId, AuthorView> = UserRepository::new(state.pool())
        .find_many(&author_ids)
        .await?
        .iter()
        .map(|user| (user.id, AuthorView::from(user)))
        .collect();
    let categories: HashMap<CategoryId, CategoryRef> = CategoryRepository::new(state.pool())
        .find_many(&category_ids)
        .await?
        .iter()
        .map(|category| (category.id, CategoryRef::from(category)))
        .collect();
    let tags: HashMap<TagId, TagRef> = TagRepository::new(state.pool())
        .find_many(&tag_ids)
        .await?
        .iter()
        .map(|tag| (tag.id, TagRef::from(tag)))
        .collect();

    Ok(posts
        .into_iter()
        .map(|post| {
            let author = authors.get(&post.author_id).cloned();
            let category = categories.get(&post.category_id).cloned();
            let post_tags = post
                .tag_ids
                .iter()
                .filter_map(|id| tags.get(id).cloned())
                .collect();
            PostDetail::assemble(post, author, category, post_tags)
        })
        .collect())
}

pub(super) async fn hydrate_page(
    state: &AppState,
    page: Page<Post>,
) -> Result<Page<PostDetail>, AppError> {
    let Page {
        rows,
        page,
        total_rows,
        total_pages,
    } = page;
    Ok(Page {
        rows: hydrate(state, rows).await?,
        page,
        total_rows,
        total_pages,
    })
}

/// Paginated post listing, newest first. The search term also matches
/// author, category, and tag names.
///
/// GET /posts
///
/// # Errors
///
/// Returns `AppError::Database` on a storage failure.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let repo = PostRepository::new(state.pool());
    let page = repo.list(query.search(), query.page_request(10)).await?;
    let page = hydrate_page(&state, page).await?;
    Ok(list_response(page, "No found post."))
}

/// GET /posts/{id}
///
/// # Errors
///
/// Returns 404 for an unknown id.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<PostId>,
) -> Result<Json<PostDetail>, AppError> {
    let repo = PostRepository::new(state.pool());
    let post = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No data found.".to_owned()))?;
    let mut details = hydrate(&state, vec![post]).await?;
    Ok(Json(details.remove(0)))
}

/// Create a post from a multipart form (title, text, category, tags[],
/// file).
///
/// POST /posts (requires auth)
///
/// # Errors
///
/// Returns 400 for missing fields, 404 for an unknown category or tag,
/// 422 for a rejected image.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = FormData::read(multipart).await?;

    let title = form.require("title", "Title is required.")?;
    let text = form.require("text", "Text is required.")?;
    let category_id: CategoryId = parse_id(
        form.require("category", "Category is required.")?,
        "Category id is not valid.",
    )?;
    let tag_ids: Vec<TagId> = parse_ids(&form.values("tags"), "Tag id is not valid.")?;

    let author = UserRepository::new(state.pool())
        .find_by_username(&claims.username)
        .await?
        .ok_or_else(|| AppError::Forbidden("Forbidden.".to_owned()))?;

    let file = form
        .file()
        .ok_or_else(|| AppError::Validation("No file uploaded.".to_owned()))?;
    let upload = ValidatedUpload::new(
        UploadKind::Content,
        &file.name,
        file.data.clone(),
        Some(&author.id.to_string()),
    )?;
    let image = state.images().save(UploadKind::Content, &upload).await?;
    let img_url = ImageStore::public_url(
        &state.config().public_base_url,
        UploadKind::Content,
        &image,
    );

    let new_post = NewPost {
        title: title.to_owned(),
        text: text.to_owned(),
        image: image.clone(),
        img_url,
        author_id: author.id,
        category_id,
        tag_ids,
    };
    if let Err(error) = persist_new_post(&state, new_post).await {
        // The image was written before the transaction; don't leave it
        // orphaned when the insert rolls back.
        if let Err(cleanup) = state.images().remove(UploadKind::Content, &image).await {
            tracing::warn!(%cleanup, %image, "Failed to remove upload after rejected post");
        }
        return Err(error);
    }

    Ok(message_response(
        StatusCode::CREATED,
        "Post created successfully.",
    ))
}

/// Inserts the post and its reference rows in one transaction.
async fn persist_new_post(state: &AppState, new_post: NewPost) -> Result<(), AppError> {
    let category_id = new_post.category_id;
    let tag_ids = new_post.tag_ids.clone();

    let mut tx = state.pool().begin().await?;
    ReferenceService::ensure_category(&mut tx, category_id).await?;
    ReferenceService::ensure_tags(&mut tx, &tag_ids).await?;
    let post = PostRepository::insert(&mut tx, new_post).await?;
    ReferenceService::attach(
        &mut tx,
        ItemKind::Post,
        post.id.as_uuid(),
        category_id,
        &tag_ids,
    )
    .await?;
    tx.commit().await?;
    Ok(())
}

/// Update a post from a multipart form. Omitting the file keeps the
/// stored image; omitting `tags` keeps the tag set.
///
/// PATCH /posts/{id} (requires auth)
///
/// # Errors
///
/// Returns 400 for missing fields, 404 for unknown post/category/tag,
/// 422 for a rejected image.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Path(id): Path<PostId>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = FormData::read(multipart).await?;

    let title = form.require("title", "Title is required.")?;
    let text = form.require("text", "Text is required.")?;
    let category_id: CategoryId = parse_id(
        form.require("category", "Category is required.")?,
        "Category id is not valid.",
    )?;
    let tag_ids: Option<Vec<TagId>> = if form.has_field("tags") {
        Some(parse_ids(&form.values("tags"), "Tag id is not valid.")?)
    } else {
        None
    };

    let post = PostRepository::new(state.pool())
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No data found.".to_owned()))?;

    let image = match form.file() {
        Some(file) => {
            let upload = ValidatedUpload::new(
                UploadKind::Content,
                &file.name,
                file.data.clone(),
                Some(&post.author_id.to_string()),
            )?;
            let name = state.images().save(UploadKind::Content, &upload).await?;
            let url = ImageStore::public_url(
                &state.config().public_base_url,
                UploadKind::Content,
                &name,
            );
            Some((name, url))
        }
        None => None,
    };

    let mut tx = state.pool().begin().await?;
    ReferenceService::ensure_category(&mut tx, category_id).await?;
    if let Some(new_tags) = &tag_ids {
        ReferenceService::ensure_tags(&mut tx, new_tags).await?;
        ReferenceService::sync_tags(
            &mut tx,
            ItemKind::Post,
            post.id.as_uuid(),
            &post.tag_ids,
            new_tags,
        )
        .await?;
    }
    ReferenceService::move_category(
        &mut tx,
        ItemKind::Post,
        post.id.as_uuid(),
        post.category_id,
        category_id,
    )
    .await?;
    PostRepository::update(
        &mut tx,
        id,
        PostChanges {
            title: Some(title.to_owned()),
            text: Some(text.to_owned()),
            image: image.clone(),
            category_id: Some(category_id),
            tag_ids,
        },
    )
    .await?;
    tx.commit().await?;

    // The replaced file goes last so a failed update never orphans the
    // live image.
    if image.is_some() {
        state
            .images()
            .remove(UploadKind::Content, &post.image)
            .await?;
    }

    Ok(message_response(
        StatusCode::OK,
        "Post updated successfully.",
    ))
}

/// Delete a post, unhooking it from its category and tags.
///
/// DELETE /posts/{id} (requires auth)
///
/// # Errors
///
/// Returns 404 for an unknown id.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Path(id): Path<PostId>,
) -> Result<Response, AppError> {
    let post = PostRepository::new(state.pool())
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No data found.".to_owned()))?;

    let mut tx = state.pool().begin().await?;
    ReferenceService::detach(
        &mut tx,
        ItemKind::Post,
        post.id.as_uuid(),
        post.category_id,
        &post.tag_ids,
    )
    .await?;
    PostRepository::delete(&mut tx, id).await?;
    tx.commit().await?;

    state
        .images()
        .remove(UploadKind::Content, &post.image)
        .await?;

    Ok(message_response(
        StatusCode::OK,
        "Post deleted successfully.",
    ))
}
