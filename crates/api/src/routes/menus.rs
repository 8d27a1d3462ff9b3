//! Navigation menu routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;

use durian_core::MenuId;

use crate::db::{MenuChanges, MenuRepository};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Menu;
use crate::state::AppState;

use super::{ListQuery, list_response, message_response};

#[derive(Debug, Deserialize)]
pub struct MenuRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub icon: String,
}

impl MenuRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required.".to_owned()));
        }
        if self.link.trim().is_empty() {
            return Err(AppError::Validation("Link is required.".to_owned()));
        }
        if self.icon.trim().is_empty() {
            return Err(AppError::Validation("Icon is required.".to_owned()));
        }
        Ok(())
    }
}

/// GET /menus
///
/// # Errors
///
/// Returns `AppError::Database` on a storage failure.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let repo = MenuRepository::new(state.pool());
    let page = repo.list(query.search(), query.page_request(32)).await?;
    Ok(list_response(page, "No found menu."))
}

/// GET /menus/{id}
///
/// # Errors
///
/// Returns 404 for an unknown id.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<MenuId>,
) -> Result<Json<Menu>, AppError> {
    let repo = MenuRepository::new(state.pool());
    let menu = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No data found.".to_owned()))?;
    Ok(Json(menu))
}

/// POST /menus (requires auth)
///
/// # Errors
///
/// Returns 400 for a missing name, link, or icon.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Json(request): Json<MenuRequest>,
) -> Result<Response, AppError> {
    request.validate()?;

    let menu = MenuRepository::new(state.pool())
        .create(
            request.name.trim(),
            request.link.trim(),
            Some(request.icon.trim()),
        )
        .await?;

    Ok(message_response(
        StatusCode::CREATED,
        format!("{} created successfully.", menu.name),
    ))
}

/// PATCH /menus/{id} (requires auth)
///
/// # Errors
///
/// Returns 400 for missing fields and 404 for an unknown id.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Path(id): Path<MenuId>,
    Json(request): Json<MenuRequest>,
) -> Result<Response, AppError> {
    request.validate()?;

    let repo = MenuRepository::new(state.pool());
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No menu found.".to_owned()))?;
    repo.update(
        id,
        MenuChanges {
            name: Some(request.name.trim().to_owned()),
            link: Some(request.link.trim().to_owned()),
            icon: Some(request.icon.trim().to_owned()),
        },
    )
    .await?;

    Ok(message_response(
        StatusCode::OK,
        "Menu successfully updated.",
    ))
}

/// DELETE /menus/{id} (requires auth)
///
/// # Errors
///
/// Returns 404 for an unknown id.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Path(id): Path<MenuId>,
) -> Result<Response, AppError> {
    let repo = MenuRepository::new(state.pool());
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Menu not found.".to_owned()))?;
    repo.delete(id).await?;

    Ok(message_response(
        StatusCode::OK,
        "Menu successfully deleted.",
    ))
}
