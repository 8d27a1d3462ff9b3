//! Authentication extractor for protected routes.
//!
//! Verifies the `Authorization: Bearer` access token and exposes the
//! verified claims to the handler.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::services::AccessClaims;
use crate::state::AppState;

/// Extractor that requires a valid access token.
///
/// Missing credentials are rejected with 401; a token that fails
/// verification (bad signature, expired) is rejected with 403.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(claims): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", claims.username)
/// }
/// ```
pub struct RequireAuth(pub AccessClaims);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Access token required.".to_string()))?;

        let claims = state.tokens().verify_access(token)?;

        Ok(Self(claims))
    }
}

/// Pull the token out of the `Authorization: Bearer` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with_header(value: &str) -> Parts {
        let (parts, ()) = Request::builder()
            .header("authorization", value)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with_header("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_non_bearer_scheme_rejected() {
        let parts = parts_with_header("Basic dXNlcjpwYXNz");
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_missing_header_rejected() {
        let (parts, ()) = Request::builder().body(()).unwrap().into_parts();
        assert_eq!(bearer_token(&parts), None);
    }
}
