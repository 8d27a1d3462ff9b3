//! Contact page routes. A singleton like the about page, plus a small
//! public endpoint exposing just the WhatsApp number.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::Response,
};
use serde_json::json;

use crate::db::{ContactContent, MediaRepository};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Contact;
use crate::services::{ImageStore, UploadKind, ValidatedUpload};
use crate::state::AppState;

use super::forms::FormData;
use super::message_response;

fn read_content(form: &FormData) -> Result<ContactContent, AppError> {
    let company_name = form.require("companyName", "Company name is required.")?;
    let description = form.require("description", "Description is required.")?;
    let whatsapp_number = form.require("whatsappNumber", "Whatsapp Number is required.")?;
    let email = form.require("email", "Email is required.")?;
    let address = form.require("address", "Address is required.")?;
    let latitude: f64 = form
        .require("latitude", "Latitude is required.")?
        .parse()
        .map_err(|_| AppError::Validation("Latitude is not valid.".to_owned()))?;
    let longitude: f64 = form
        .require("longitude", "Longitude is required.")?
        .parse()
        .map_err(|_| AppError::Validation("Longitude is not valid.".to_owned()))?;

    Ok(ContactContent {
        company_name: company_name.to_owned(),
        description: description.to_owned(),
        whatsapp_number: whatsapp_number.to_owned(),
        email: email.to_owned(),
        address: address.to_owned(),
        latitude,
        longitude,
        image: None,
    })
}

/// GET /contact
///
/// # Errors
///
/// Returns `AppError::Database` on a storage failure.
pub async fn show(State(state): State<AppState>) -> Result<Json<Option<Contact>>, AppError> {
    let contact = MediaRepository::new(state.pool()).get_contact().await?;
    Ok(Json(contact))
}

/// GET /contact/whatsapp-number
///
/// # Errors
///
/// Returns `AppError::Database` on a storage failure.
pub async fn whatsapp_number(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let contact = MediaRepository::new(state.pool()).get_contact().await?;
    Ok(Json(json!({
        "whatsappNumber": contact.map(|c| c.whatsapp_number),
    })))
}

/// Create the contact page from a multipart form.
///
/// POST /contact (requires auth)
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
    let content = read_content(&form)?;

    let file = form
        .file()
        .ok_or_else(|| AppError::Validation("No file uploaded.".to_owned()))?;
    let upload = ValidatedUpload::new(
        UploadKind::Product,
        &file.name,
        file.data.clone(),
        Some(&claims.username),
    )?;
    let image = state.images().save(UploadKind::Product, &upload).await?;
    let img_url = ImageStore::public_url(
        &state.config().public_base_url,
        UploadKind::Product,
        &image,
    );

    MediaRepository::new(state.pool())
        .create_contact(content, &image, &img_url)
        .await?;

    Ok(message_response(
        StatusCode::CREATED,
        "Contact created successfully.",
    ))
}

/// Update the contact page. Omitting the file keeps the stored image.
///
/// PATCH /contact (requires auth)
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
    let mut content = read_content(&form)?;

    let repo = MediaRepository::new(state.pool());
    let contact = repo
        .get_contact()
        .await?
        .ok_or_else(|| AppError::NotFound("No data found.".to_owned()))?;

    if let Some(file) = form.file() {
        let upload = ValidatedUpload::new(
            UploadKind::Product,
            &file.name,
            file.data.clone(),
            Some(&claims.username),
        )?;
        let name = state.images().save(UploadKind::Product, &upload).await?;
        let url = ImageStore::public_url(
            &state.config().public_base_url,
            UploadKind::Product,
            &name,
        );
        content.image = Some((name, url));
    }

    let replaced = content.image.is_some();
    repo.update_contact(content).await?;

    if replaced {
        state
            .images()
            .remove(UploadKind::Product, &contact.image)
            .await?;
    }

    Ok(message_response(
        StatusCode::OK,
        "Contact updated successfully.",
    ))
}

/// DELETE /contact (requires auth)
///
/// # Errors
///
/// Returns 404 before the page exists.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
) -> Result<Response, AppError> {
    let repo = MediaRepository::new(state.pool());
    let contact = repo
        .get_contact()
        .await?
        .ok_or_else(|| AppError::NotFound("No data found.".to_owned()))?;

    repo.delete_contact().await?;
    state
        .images()
        .remove(UploadKind::Product, &contact.image)
        .await?;

    Ok(message_response(
        StatusCode::OK,
        "Contact deleted successfully.",
    ))
}
