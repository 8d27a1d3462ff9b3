//! Promotional banner routes.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Response,
};

use durian_core::BannerId;

use crate::db::{BannerChanges, MediaRepository};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Banner;
use crate::services::{ImageStore, UploadKind, ValidatedUpload};
use crate::state::AppState;

use super::forms::FormData;
use super::{ListQuery, list_response, message_response};

/// GET /banners
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
        .list_banners(query.search(), query.page_request(10))
        .await?;
    Ok(list_response(page, "No found banner"))
}

/// GET /banners/{id}
///
/// # Errors
///
/// Returns 404 for an unknown id.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<BannerId>,
) -> Result<Json<Banner>, AppError> {
    let banner = MediaRepository::new(state.pool())
        .find_banner(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No data found".to_owned()))?;
    Ok(Json(banner))
}

/// Create a banner from a multipart form (title, text, file).
///
/// POST /banners (requires auth)
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

    let title = form.require("title", "Title is required")?;
    let text = form.require("text", "Text is required")?;
    let file = form
        .file()
        .ok_or_else(|| AppError::Validation("No file uploaded".to_owned()))?;

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
        .create_banner(title, text, &image, &img_url)
        .await?;

    Ok(message_response(
        StatusCode::CREATED,
        "Banner created successfully",
    ))
}

/// Update a banner. Omitting the file keeps the stored image.
///
/// PATCH /banners/{id} (requires auth)
///
/// # Errors
///
/// Returns 400 for missing fields, 404 for an unknown id, 422 for a
/// rejected image.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    Path(id): Path<BannerId>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = FormData::read(multipart).await?;

    let title = form.require("title", "Title is required")?;
    let text = form.require("text", "Text is required")?;

    let repo = MediaRepository::new(state.pool());
    let banner = repo
        .find_banner(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No data found".to_owned()))?;

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

    repo.update_banner(
        id,
        BannerChanges {
            title: Some(title.to_owned()),
            text: Some(text.to_owned()),
            image: image.clone(),
        },
    )
    .await?;

    if image.is_some() {
        state
            .images()
            .remove(UploadKind::Content, &banner.image)
            .await?;
    }

    Ok(message_response(
        StatusCode::OK,
        "Banner updated successfully",
    ))
}

/// DELETE /banners/{id} (requires auth)
///
/// # Errors
///
/// Returns 404 for an unknown id.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Path(id): Path<BannerId>,
) -> Result<Response, AppError> {
    let repo = MediaRepository::new(state.pool());
    let banner = repo
        .find_banner(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No data found".to_owned()))?;

    repo.delete_banner(id).await?;
    state
        .images()
        .remove(UploadKind::Content, &banner.image)
        .await?;

    Ok(message_response(
        StatusCode::OK,
        "Banner deleted successfully",
    ))
}
