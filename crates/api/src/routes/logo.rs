//! Site logo routes. Another singleton; the logo has its own upload
//! kind with a tighter size limit and its own directory.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::Response,
};

use crate::db::MediaRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Logo;
use crate::services::{ImageStore, UploadKind, ValidatedUpload};
use crate::state::AppState;

use super::forms::FormData;
use super::message_response;

/// GET /logo
///
/// # Errors
///
/// Returns `AppError::Database` on a storage failure.
pub async fn show(State(state): State<AppState>) -> Result<Json<Option<Logo>>, AppError> {
    let logo = MediaRepository::new(state.pool()).get_logo().await?;
    Ok(Json(logo))
}

/// POST /logo (requires auth)
///
/// # Errors
///
/// Returns 400 for a missing file, 409 once a logo exists, 422 for a
/// rejected image.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = FormData::read(multipart).await?;
    let file = form
        .file()
        .ok_or_else(|| AppError::Validation("No file uploaded".to_owned()))?;

    let upload = ValidatedUpload::new(
        UploadKind::Logo,
        &file.name,
        file.data.clone(),
        Some(&claims.username),
    )?;
    let image = state.images().save(UploadKind::Logo, &upload).await?;
    let img_url =
        ImageStore::public_url(&state.config().public_base_url, UploadKind::Logo, &image);

    MediaRepository::new(state.pool())
        .create_logo(&image, &img_url)
        .await?;

    Ok(message_response(
        StatusCode::CREATED,
        "Logo created successfully",
    ))
}

/// Replace the logo. Omitting the file leaves the stored one in place.
///
/// PATCH /logo (requires auth)
///
/// # Errors
///
/// Returns 404 before a logo exists, 422 for a rejected image.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = FormData::read(multipart).await?;

    let repo = MediaRepository::new(state.pool());
    let logo = repo
        .get_logo()
        .await?
        .ok_or_else(|| AppError::NotFound("No data found".to_owned()))?;

    if let Some(file) = form.file() {
        let upload = ValidatedUpload::new(
            UploadKind::Logo,
            &file.name,
            file.data.clone(),
            Some(&claims.username),
        )?;
        let image = state.images().save(UploadKind::Logo, &upload).await?;
        let img_url =
            ImageStore::public_url(&state.config().public_base_url, UploadKind::Logo, &image);
        repo.update_logo(&image, &img_url).await?;
        state.images().remove(UploadKind::Logo, &logo.image).await?;
    }

    Ok(message_response(StatusCode::OK, "Logo updated successfully"))
}
