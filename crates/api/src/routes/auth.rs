//! Authentication routes: login, refresh, logout, email verification,
//! and password reset.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use durian_core::Email;
use serde::Deserialize;
use serde_json::json;
use time::Duration;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::services::{hash_password, validate_password, verify_password};
use crate::state::AppState;

use super::message_response;

const REFRESH_COOKIE: &str = "refreshToken";

fn refresh_cookie(token: String) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(Duration::days(1))
        .build()
}

fn removal_cookie() -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, ""))
        .path("/")
        .build()
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Log in with username and password.
///
/// POST /auth/login
///
/// Unknown users, bad passwords, and unverified accounts all produce
/// the same message so the response leaks nothing about which check
/// failed.
///
/// # Errors
///
/// Returns `AppError` on a failed login or a storage failure.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Response), AppError> {
    let repo = UserRepository::new(state.pool());

    let rejected = || AppError::Validation("Incorrect username or password.".to_owned());

    let user = repo
        .find_by_username(&request.username)
        .await?
        .ok_or_else(rejected)?;

    if !user.is_verified || !verify_password(&request.password, &user.password_hash) {
        return Err(rejected());
    }

    let access_token = state.tokens().issue_access(&user)?;
    let refresh_token = state.tokens().issue_refresh(&user)?;
    repo.set_refresh_token(user.id, &refresh_token).await?;

    let jar = jar.add(refresh_cookie(refresh_token));
    let body = Json(json!({
        "message": "Login successfully.",
        "accessToken": access_token,
    }))
    .into_response();

    Ok((jar, body))
}

/// Mint a fresh access token from the refresh cookie.
///
/// GET /auth/token
///
/// # Errors
///
/// Returns 401 without a cookie, 403 when the stored token does not
/// match or fails verification.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_owned())
        .ok_or_else(|| AppError::Unauthorized("Refresh token required.".to_owned()))?;

    let repo = UserRepository::new(state.pool());
    let user = repo
        .find_by_refresh_token(&token)
        .await?
        .ok_or_else(|| AppError::Forbidden("Invalid refresh token.".to_owned()))?;

    state.tokens().verify_refresh(&token)?;

    let access_token = state.tokens().issue_access(&user)?;
    Ok(Json(json!({ "accessToken": access_token })))
}

/// Clear the refresh token and cookie.
///
/// DELETE /auth/logout
///
/// Idempotent: without a cookie or a matching user it answers 204.
///
/// # Errors
///
/// Returns `AppError::Database` on a storage failure.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), AppError> {
    let Some(token) = jar.get(REFRESH_COOKIE).map(|c| c.value().to_owned()) else {
        return Ok((jar, StatusCode::NO_CONTENT));
    };

    let repo = UserRepository::new(state.pool());
    let jar = jar.remove(removal_cookie());

    if repo.find_by_refresh_token(&token).await?.is_none() {
        return Ok((jar, StatusCode::NO_CONTENT));
    }

    repo.clear_refresh_token(&token).await?;
    Ok((jar, StatusCode::OK))
}

/// Current user, resolved from the refresh cookie.
///
/// GET /auth/me
///
/// # Errors
///
/// Returns `AppError::Database` on a storage failure.
pub async fn me(State(state): State<AppState>, jar: CookieJar) -> Result<Response, AppError> {
    let Some(token) = jar.get(REFRESH_COOKIE).map(|c| c.value().to_owned()) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let repo = UserRepository::new(state.pool());
    let user = repo.find_by_refresh_token(&token).await?;

    Ok(Json(json!({ "user": user })).into_response())
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

/// Confirm an email address with the token from the verification link.
///
/// GET /auth/verify-email?token=
///
/// The stored token is cleared on success, so each link works once.
///
/// # Errors
///
/// Returns 403 with distinct messages for expired and invalid tokens.
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Response, AppError> {
    state.tokens().verify_email_verification(&query.token)?;

    let repo = UserRepository::new(state.pool());
    let user = repo
        .find_by_email_token(&query.token)
        .await?
        .ok_or_else(|| AppError::Forbidden("Invalid token.".to_owned()))?;

    repo.mark_verified(user.id).await?;

    Ok(message_response(
        StatusCode::OK,
        "Email verified successfully.",
    ))
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

/// Re-issue and re-send the verification email.
///
/// POST /auth/request-new-email-token
///
/// # Errors
///
/// Returns 404 for an unknown address, 400 when already verified.
pub async fn request_new_email_token(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<Response, AppError> {
    let repo = UserRepository::new(state.pool());
    let email = Email::parse(&request.email)
        .map_err(|_| AppError::Validation("Email is not valid.".to_owned()))?;

    let user = repo
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_owned()))?;

    if user.is_verified {
        return Err(AppError::Validation(
            "Email is already verified.".to_owned(),
        ));
    }

    let token = state.tokens().issue_email_verification(&user.email)?;
    repo.set_email_token(user.id, &token).await?;
    state.email().send_verification_email(&user.email, &token).await?;

    Ok(message_response(
        StatusCode::OK,
        "Verification email sent.",
    ))
}

/// Start a password reset: issue a token and email the reset link.
///
/// POST /auth/send-reset-password-token
///
/// # Errors
///
/// Returns 404 for an unknown address.
pub async fn send_reset_password_token(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<Response, AppError> {
    let repo = UserRepository::new(state.pool());
    let email = Email::parse(&request.email)
        .map_err(|_| AppError::Validation("Email is not valid.".to_owned()))?;

    let user = repo
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_owned()))?;

    let token = state.tokens().issue_password_reset(&user.email)?;
    repo.set_reset_token(user.id, &token).await?;
    state
        .email()
        .send_reset_password_email(&user.email, &token)
        .await?;

    Ok(message_response(
        StatusCode::OK,
        "Reset password email sent.",
    ))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

/// Finish a password reset with the emailed token.
///
/// POST /auth/reset-password/{token}
///
/// The stored token is cleared with the hash update, so a reset link
/// cannot be replayed.
///
/// # Errors
///
/// Returns 403 for expired/invalid/already-used tokens and 400 when
/// the new password fails the policy.
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Response, AppError> {
    state.tokens().verify_password_reset(&token)?;

    let repo = UserRepository::new(state.pool());
    let user = repo
        .find_by_reset_token(&token)
        .await?
        .ok_or_else(|| AppError::Forbidden("Invalid token.".to_owned()))?;

    validate_password(&request.password)?;
    let hash = hash_password(&request.password)?;
    repo.reset_password(user.id, &hash).await?;

    Ok(message_response(
        StatusCode::OK,
        "Password reset successfully.",
    ))
}
