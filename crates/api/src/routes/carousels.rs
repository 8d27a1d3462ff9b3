//! Homepage carousel routes. Same shape as banners with a description
//! instead of body text.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Response,
};

use durian_core::CarouselId;

use crate::db::{CarouselChanges, MediaRepository};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Carousel;
use crate::services::{ImageStore, UploadKind, ValidatedUpload};
use crate::state::AppState;

use super::forms::FormData;
use super::{ListQuery, list_response, message_response};

/// GET /carousels
///
/// # Errors
///
/// Returns `AppError::Database` on a storage failure.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let repo = MediaRepository::new(state.pool());
    let page = repo
        .list_carousels(query.search(), query.page_request(10))
        .await?;
    Ok(list_response(page, "No found carousel."))
}

/// GET /carousels/{id}
///
/// # Errors
///
/// Returns 404 for an unknown id.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CarouselId>,
) -> Result<Json<Carousel>, AppError> {
    let carousel = MediaRepository::new(state.pool())
        .find_carousel(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No data found.".to_owned()))?;
    Ok(Json(carousel))
}

/// Create a carousel slide from a multipart form (title, description,
/// file).
///
/// POST /carousels (requires auth)
///
/// # Errors
///
/// Returns 400 for missing fields, 422 for a rejected image.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = FormData::read(multipart).await?;

    let title = form.require("title", "Title is required.")?;
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

    MediaRepository::new(state.pool())
        .create_carousel(title, description, &image, &img_url)
        .await?;

    Ok(message_response(
        StatusCode::CREATED,
        "Carousel created successfully.",
    ))
}

/// Update a carousel slide. Omitting the file keeps the stored image.
///
/// PATCH /carousels/{id} (requires auth)
///
/// # Errors
///
/// Returns 400 for missing fields, 404 for an unknown id, 422 for a
/// rejected image.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    Path(id): Path<CarouselId>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = FormData::read(multipart).await?;

    let title = form.require("title", "Title is required.")?;
    let description = form.require("description", "Description is required.")?;

    let repo = MediaRepository::new(state.pool());
    let carousel = repo
        .find_carousel(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No data found.".to_owned()))?;

    let image = match form.file() {
        Some(file) => {
            let upload = ValidatedUpload::new(
                UploadKind::Content,
                &file.name,
                file.data.clone(),
                Some(&claims.username),
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

    repo.update_carousel(
        id,
        CarouselChanges {
            title: Some(title.to_owned()),
            description: Some(description.to_owned()),
            image: image.clone(),
        },
    )
    .await?;

    if image.is_some() {
        state
            .images()
            .remove(UploadKind::Content, &carousel.image)
            .await?;
    }

    Ok(message_response(
        StatusCode::OK,
        "Carousel updated successfully.",
    ))
}

/// DELETE /carousels/{id} (requires auth)
///
/// # Errors
///
/// Returns 404 for an unknown id.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Path(id): Path<CarouselId>,
) -> Result<Response, AppError> {
    let repo = MediaRepository::new(state.pool());
    let carousel = repo
        .find_carousel(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No data found.".to_owned()))?;

    repo.delete_carousel(id).await?;
    state
        .images()
        .remove(UploadKind::Content, &carousel.image)
        .await?;

    Ok(message_response(
        StatusCode::OK,
        "Carousel deleted successfully.",
    ))
}
