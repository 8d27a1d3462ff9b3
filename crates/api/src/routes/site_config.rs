//! Site configuration routes. The row is seeded by a migration, so
//! there is no create; only read and partial update.

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::db::{MediaRepository, SiteConfigChanges};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::SiteConfig;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfigRequest {
    pub theme: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub site_name: Option<String>,
    pub site_description: Option<String>,
    pub keywords: Option<Vec<String>>,
}

/// GET /config
///
/// # Errors
///
/// Returns `AppError::Database` on a storage failure.
pub async fn show(State(state): State<AppState>) -> Result<Json<Option<SiteConfig>>, AppError> {
    let config = MediaRepository::new(state.pool()).get_site_config().await?;
    Ok(Json(config))
}

/// Partial update; absent fields keep their stored values. Returns the
/// updated configuration.
///
/// PATCH /config (requires auth)
///
/// # Errors
///
/// Returns 404 if the configuration row is missing.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Json(request): Json<SiteConfigRequest>,
) -> Result<Json<SiteConfig>, AppError> {
    let config = MediaRepository::new(state.pool())
        .update_site_config(SiteConfigChanges {
            theme: request.theme,
            primary_color: request.primary_color,
            secondary_color: request.secondary_color,
            background_color: request.background_color,
            text_color: request.text_color,
            site_name: request.site_name,
            site_description: request.site_description,
            keywords: request.keywords,
        })
        .await?;
    Ok(Json(config))
}
