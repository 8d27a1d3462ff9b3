//! SEO keyword routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;

use durian_core::SeoEntryId;

use crate::db::SeoRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::SeoEntry;
use crate::state::AppState;

use super::{ListQuery, list_response, message_response};

#[derive(Debug, Deserialize)]
pub struct SeoRequest {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub description: String,
}

impl SeoRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.keyword.trim().is_empty() {
            return Err(AppError::Validation("Keyword is required.".to_owned()));
        }
        if self.description.trim().is_empty() {
            return Err(AppError::Validation("Description is required.".to_owned()));
        }
        Ok(())
    }
}

/// GET /seo
///
/// # Errors
///
/// Returns `AppError::Database` on a storage failure.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let repo = SeoRepository::new(state.pool());
    let page = repo.list(query.search(), query.page_request(10)).await?;
    Ok(list_response(page, "No found SEO data."))
}

/// GET /seo/{id}
///
/// # Errors
///
/// Returns 404 for an unknown id.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<SeoEntryId>,
) -> Result<Json<SeoEntry>, AppError> {
    let repo = SeoRepository::new(state.pool());
    let entry = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No data found.".to_owned()))?;
    Ok(Json(entry))
}

/// POST /seo (requires auth)
///
/// # Errors
///
/// Returns 400 for a missing keyword or description.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Json(request): Json<SeoRequest>,
) -> Result<Response, AppError> {
    request.validate()?;

    SeoRepository::new(state.pool())
        .create(request.keyword.trim(), request.description.trim())
        .await?;

    Ok(message_response(
        StatusCode::CREATED,
        "SEO Data created successfully.",
    ))
}

/// PATCH /seo/{id} (requires auth)
///
/// # Errors
///
/// Returns 400 for missing fields and 404 for an unknown id.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Path(id): Path<SeoEntryId>,
    Json(request): Json<SeoRequest>,
) -> Result<Response, AppError> {
    request.validate()?;

    let repo = SeoRepository::new(state.pool());
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No data found.".to_owned()))?;
    repo.update(id, request.keyword.trim(), request.description.trim())
        .await?;

    Ok(message_response(
        StatusCode::OK,
        "SEO data updated successfully.",
    ))
}

/// DELETE /seo/{id} (requires auth)
///
/// # Errors
///
/// Returns 404 for an unknown id.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Path(id): Path<SeoEntryId>,
) -> Result<Response, AppError> {
    let repo = SeoRepository::new(state.pool());
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No data found.".to_owned()))?;
    repo.delete(id).await?;

    Ok(message_response(
        StatusCode::OK,
        "SEO data deleted successfully.",
    ))
}
