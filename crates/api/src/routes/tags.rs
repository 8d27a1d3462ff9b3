//! Tag routes. Plain JSON bodies; tags carry no image.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;

use durian_core::TagId;

use crate::db::TagRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Tag;
use crate::state::AppState;

use super::forms::capitalize;
use super::{ListQuery, list_response, message_response};

#[derive(Debug, Deserialize)]
pub struct TagRequest {
    #[serde(default)]
    pub name: String,
}

/// GET /tags
///
/// # Errors
///
/// Returns `AppError::Database` on a storage failure.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let repo = TagRepository::new(state.pool());
    let page = repo.list(query.search(), query.page_request(32)).await?;
    Ok(list_response(page, "No found tag."))
}

/// GET /tags/{id}
///
/// # Errors
///
/// Returns 404 for an unknown id.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<TagId>,
) -> Result<Json<Tag>, AppError> {
    let repo = TagRepository::new(state.pool());
    let tag = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No data found.".to_owned()))?;
    Ok(Json(tag))
}

/// Create a tag. The name is stored with its first letter uppercased.
///
/// POST /tags (requires auth)
///
/// # Errors
///
/// Returns 400 for a missing name and 409 for a duplicate.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Json(request): Json<TagRequest>,
) -> Result<Response, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required.".to_owned()));
    }
    let name = capitalize(request.name.trim());

    TagRepository::new(state.pool()).create(&name).await?;

    Ok(message_response(
        StatusCode::CREATED,
        format!("{name} created successfully."),
    ))
}

/// PATCH /tags/{id} (requires auth)
///
/// # Errors
///
/// Returns 400 for a missing name, 404 for an unknown id, 409 for a
/// duplicate name.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Path(id): Path<TagId>,
    Json(request): Json<TagRequest>,
) -> Result<Response, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required.".to_owned()));
    }
    let name = capitalize(request.name.trim());

    let repo = TagRepository::new(state.pool());
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No tag found.".to_owned()))?;
    repo.update(id, &name).await?;

    Ok(message_response(
        StatusCode::OK,
        "Tag successfully updated.",
    ))
}

/// Delete a tag that nothing references any more.
///
/// DELETE /tags/{id} (requires auth)
///
/// # Errors
///
/// Returns 404 for an unknown id, 409 while posts or products still
/// reference the tag.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Path(id): Path<TagId>,
) -> Result<Response, AppError> {
    let repo = TagRepository::new(state.pool());
    if repo.count_references(id).await? > 0 {
        return Err(AppError::Conflict(
            "Can't delete tags. Please delete linked posts first.".to_owned(),
        ));
    }

    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag not found.".to_owned()))?;
    repo.delete(id).await?;

    Ok(message_response(
        StatusCode::OK,
        "Tag successfully deleted.",
    ))
}
