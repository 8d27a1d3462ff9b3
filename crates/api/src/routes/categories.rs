//! Category routes.
//!
//! A category cannot be deleted while posts or products still point at
//! it; callers must relink or delete those first.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Response,
};
use durian_core::CategoryId;

use crate::db::{CategoryChanges, CategoryRepository, PostRepository};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Category;
use crate::services::{ImageStore, UploadKind, ValidatedUpload};
use crate::state::AppState;

use super::forms::{FormData, capitalize};
use super::posts::hydrate_page;
use super::{ListQuery, list_response, message_response};

/// GET /categories
///
/// # Errors
///
/// Returns `AppError::Database` on a storage failure.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let repo = CategoryRepository::new(state.pool());
    let page = repo.list(query.search(), query.page_request(32)).await?;
    Ok(list_response(page, "No found category."))
}

/// GET /categories/{id}
///
/// # Errors
///
/// Returns 404 for an unknown id.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>, AppError> {
    let repo = CategoryRepository::new(state.pool());
    let category = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No data found.".to_owned()))?;
    Ok(Json(category))
}

/// Posts filed under a category, paginated.
///
/// GET /categories/{id}/posts
///
/// # Errors
///
/// Returns 404 for an unknown category.
pub async fn posts_in_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    CategoryRepository::new(state.pool())
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found.".to_owned()))?;

    let page = PostRepository::new(state.pool())
        .list_by_category(id, query.page_request(10))
        .await?;
    let page = hydrate_page(&state, page).await?;
    Ok(list_response(page, "No found post in this category."))
}

/// Create a category from a multipart form (name, description, file).
/// The name is stored with its first letter uppercased.
///
/// POST /categories (requires auth)
///
/// # Errors
///
/// Returns 400 for missing fields, 409 for a duplicate name, 422 for a
/// rejected image.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = FormData::read(multipart).await?;

    let name = capitalize(form.require("name", "Name is required.")?);
    let description = form.require("description", "Description is required.")?;
    let file = form
        .file()
        .ok_or_else(|| AppError::Validation("No file uploaded.".to_owned()))?;

    let upload = ValidatedUpload::new(
        UploadKind::Content,
        &file.name,
        file.data.clone(),
        Some(&claims.username),
    )?;
    let image = state.images().save(UploadKind::Content, &upload).await?;
    let img_url = ImageStore::public_url(
        &state.config().public_base_url,
        UploadKind::Content,
        &image,
    );

    CategoryRepository::new(state.pool())
        .create(&name, description, &image, &img_url)
        .await?;

    Ok(message_response(
        StatusCode::CREATED,
        "Category created successfully.",
    ))
}

/// Update a category. Omitting the file keeps the stored image.
///
/// PATCH /categories/{id} (requires auth)
///
/// # Errors
///
/// Returns 400 for missing fields, 404 for an unknown id, 409 for a
/// duplicate name, 422 for a rejected image.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    Path(id): Path<CategoryId>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = FormData::read(multipart).await?;

    let name = capitalize(form.require("name", "Name is required.")?);
    let description = form.require("description", "Description is required.")?;

    let repo = CategoryRepository::new(state.pool());
    let category = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No category found.".to_owned()))?;

    let image = match form.file() {
        Some(file) => {
            let upload = ValidatedUpload::new(
                UploadKind::Content,
                &file.name,
                file.data.clone(),
                Some(&claims.username),
            )?;
            let new_name = state.images().save(UploadKind::Content, &upload).await?;
            let url = ImageStore::public_url(
                &state.config().public_base_url,
                UploadKind::Content,
                &new_name,
            );
            Some((new_name, url))
        }
        None => None,
    };

    repo.update(
        id,
        CategoryChanges {
            name: Some(name),
            description: Some(description.to_owned()),
            image: image.clone(),
        },
    )
    .await?;

    if image.is_some() {
        state
            .images()
            .remove(UploadKind::Content, &category.image)
            .await?;
    }

    Ok(message_response(
        StatusCode::OK,
        "Category updated successfully.",
    ))
}

/// Delete a category that nothing references any more.
///
/// DELETE /categories/{id} (requires auth)
///
/// # Errors
///
/// Returns 404 for an unknown id, 409 while posts or products still
/// reference the category.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Path(id): Path<CategoryId>,
) -> Result<Response, AppError> {
    let repo = CategoryRepository::new(state.pool());
    if repo.count_references(id).await? > 0 {
        return Err(AppError::Conflict(
            "Can't delete category. Please delete linked posts first.".to_owned(),
        ));
    }

    let category = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found.".to_owned()))?;

    repo.delete(id).await?;
    state
        .images()
        .remove(UploadKind::Content, &category.image)
        .await?;

    Ok(message_response(
        StatusCode::OK,
        "Category successfully deleted.",
    ))
}
