//! Author account routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use durian_core::{Email, UserId};
use serde::Deserialize;

use crate::db::{UserChanges, UserRepository};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::services::{hash_password, validate_password};
use crate::state::AppState;

use super::{ListQuery, list_response, message_response};

const MIN_USERNAME_LENGTH: usize = 5;

fn valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Paginated user listing.
///
/// GET /users (requires auth)
///
/// # Errors
///
/// Returns `AppError::Database` on a storage failure.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let repo = UserRepository::new(state.pool());
    let page = repo
        .list(query.search(), query.page_request(10))
        .await?;
    Ok(list_response(page, "No found user."))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Register a new author account and send the verification email.
///
/// POST /users
///
/// The account starts unverified; login is refused until the emailed
/// link is followed.
///
/// # Errors
///
/// Returns 400 for each failed field check, 409 for a taken username
/// or email.
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Response, AppError> {
    let invalid = |message: &str| AppError::Validation(message.to_owned());

    let name = request.name.as_deref().filter(|v| !v.is_empty());
    let Some(name) = name else {
        return Err(invalid("Name is required."));
    };

    let username = request.username.as_deref().filter(|v| !v.is_empty());
    let Some(username) = username else {
        return Err(invalid("Username is required."));
    };
    if username.len() < MIN_USERNAME_LENGTH {
        return Err(invalid("Username must be at least 5 characters."));
    }
    if !valid_username(username) {
        return Err(invalid(
            "Username may only contain letters, numbers, underscores and hyphens.",
        ));
    }

    let email = request.email.as_deref().filter(|v| !v.is_empty());
    let Some(email) = email else {
        return Err(invalid("Email is required."));
    };
    let email = Email::parse(email).map_err(|_| invalid("Email is not valid."))?;

    let password = request.password.as_deref().filter(|v| !v.is_empty());
    let Some(password) = password else {
        return Err(invalid("Password is required."));
    };
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let email_token = state.tokens().issue_email_verification(email.as_ref())?;

    let repo = UserRepository::new(state.pool());
    let user = repo
        .create(name, username, &email, &password_hash, &email_token)
        .await?;

    // Delivery trouble should not lose the registration; the token can
    // be re-sent through /auth/request-new-email-token.
    if let Err(error) = state
        .email()
        .send_verification_email(&user.email, &email_token)
        .await
    {
        tracing::warn!(%error, email = %user.email, "Failed to send verification email");
    }

    Ok(message_response(
        StatusCode::CREATED,
        "Register user successfully.",
    ))
}

/// GET /users/{id}
///
/// # Errors
///
/// Returns 404 for an unknown id.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<crate::models::User>, AppError> {
    let repo = UserRepository::new(state.pool());
    let user = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No user found.".to_owned()))?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Update name, username, email, and optionally the password.
///
/// PATCH /users/{id}
///
/// A duplicate username or email is only rejected when it belongs to a
/// different user, so saving unchanged fields stays valid.
///
/// # Errors
///
/// Returns 404 for an unknown id, 400 for failed field checks, 409 for
/// duplicates.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Response, AppError> {
    let invalid = |message: &str| AppError::Validation(message.to_owned());

    let repo = UserRepository::new(state.pool());
    let user = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No user found.".to_owned()))?;

    let name = request.name.as_deref().filter(|v| !v.is_empty());
    let Some(name) = name else {
        return Err(invalid("Name is required."));
    };

    let username = request.username.as_deref().filter(|v| !v.is_empty());
    let Some(username) = username else {
        return Err(invalid("Username is required."));
    };
    if let Some(existing) = repo.find_by_username(username).await?
        && existing.id != user.id
    {
        return Err(AppError::Conflict("Username is already exists.".to_owned()));
    }

    let email = request.email.as_deref().filter(|v| !v.is_empty());
    let Some(email) = email else {
        return Err(invalid("Email is required."));
    };
    let email = Email::parse(email).map_err(|_| invalid("Email is not valid."))?;
    if let Some(existing) = repo.find_by_email(&email).await?
        && existing.id != user.id
    {
        return Err(AppError::Conflict("Email is already exists.".to_owned()));
    }

    let password_hash = match request.password.as_deref().filter(|v| !v.is_empty()) {
        Some(password) => {
            validate_password(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    repo.update(
        user.id,
        UserChanges {
            name: Some(name.to_owned()),
            username: Some(username.to_owned()),
            email: Some(email),
            password_hash,
        },
    )
    .await?;

    Ok(message_response(
        StatusCode::OK,
        "User successfully updated.",
    ))
}

/// Delete an account with no remaining authored content.
///
/// DELETE /users/{id}
///
/// # Errors
///
/// Returns 409 while the user still owns posts or products, 404 for an
/// unknown id.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Response, AppError> {
    let repo = UserRepository::new(state.pool());

    if repo.count_authored(id).await? > 0 {
        return Err(AppError::Conflict(
            "Can't delete user. Please delete linked posts first.".to_owned(),
        ));
    }

    if repo.find_by_id(id).await?.is_none() {
        return Err(AppError::NotFound("User not found.".to_owned()));
    }

    repo.delete(id).await?;

    Ok(message_response(
        StatusCode::OK,
        "User deleted successfully.",
    ))
}

#[cfg(test)]
mod tests {
    use super::valid_username;

    #[test]
    fn accepts_letters_digits_underscores_hyphens() {
        assert!(valid_username("pak_jayus-01"));
        assert!(valid_username("admin"));
    }

    #[test]
    fn rejects_spaces_and_symbols() {
        assert!(!valid_username("pak jayus"));
        assert!(!valid_username("jayus!"));
        assert!(!valid_username(""));
    }
}
