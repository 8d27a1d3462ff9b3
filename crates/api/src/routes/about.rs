//! About page routes. The about page is a singleton: one row, created
//! once, then updated or deleted.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::Response,
};

use crate::db::{AboutContent, MediaRepository};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::About;
use crate::services::{ImageStore, UploadKind, ValidatedUpload};
use crate::state::AppState;

use super::forms::FormData;
use super::message_response;

/// GET /about
///
/// # Errors
///
/// Returns `AppError::Database` on a storage failure.
pub async fn show(State(state): State<AppState>) -> Result<Json<Option<About>>, AppError> {
    let about = MediaRepository::new(state.pool()).get_about().await?;
    Ok(Json(about))
}

/// Create the about page from a multipart form (title, text, maps,
/// file).
///
/// POST /about (requires auth)
///
/// # Errors
///
/// Returns 400 for missing fields, 409 once the page exists, 422 for a
/// rejected image.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = FormData::read(multipart).await?;

    let title = form.require("title", "Title is required.")?;
    let text = form.require("text", "Text is required.")?;
    let maps = form.require("maps", "Maps is required.")?;
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
        .create_about(title, text, maps, &image, &img_url)
        .await?;

    Ok(message_response(
        StatusCode::CREATED,
        "About created successfully.",
    ))
}

/// Update the about page. Omitting the file keeps the stored image.
///
/// PATCH /about (requires auth)
///
/// # Errors
///
/// Returns 400 for missing fields, 404 before the page exists, 422 for
/// a rejected image.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = FormData::read(multipart).await?;

    let title = form.require("title", "Title is required.")?;
    let text = form.require("text", "Text is required.")?;
    let maps = form.require("maps", "Maps is required.")?;

    let repo = MediaRepository::new(state.pool());
    let about = repo
        .get_about()
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

    repo.update_about(AboutContent {
        title: title.to_owned(),
        text: text.to_owned(),
        maps: maps.to_owned(),
        image: image.clone(),
    })
    .await?;

    if image.is_some() {
        state
            .images()
            .remove(UploadKind::Content, &about.image)
            .await?;
    }

    Ok(message_response(
        StatusCode::OK,
        "About updated successfully.",
    ))
}

/// DELETE /about (requires auth)
///
/// # Errors
///
/// Returns 404 before the page exists.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
) -> Result<Response, AppError> {
    let repo = MediaRepository::new(state.pool());
    let about = repo
        .get_about()
        .await?
        .ok_or_else(|| AppError::NotFound("No data found.".to_owned()))?;

    repo.delete_about().await?;
    state
        .images()
        .remove(UploadKind::Content, &about.image)
        .await?;

    Ok(message_response(
        StatusCode::OK,
        "About deleted successfully.",
    ))
}
