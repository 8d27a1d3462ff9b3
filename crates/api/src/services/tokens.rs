//! JWT issuing and verification.
//!
//! Four independently-keyed token families: short-lived access tokens
//! carried as `Bearer` headers, day-long refresh tokens stored in an
//! HTTP-only cookie (and mirrored in the user row so they can be
//! revoked), and one-hour email-verification and password-reset tokens
//! delivered by email.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use durian_core::UserId;

use crate::models::User;

pub const ACCESS_TOKEN_TTL: Duration = Duration::minutes(16);
pub const REFRESH_TOKEN_TTL: Duration = Duration::days(1);
pub const EMAIL_TOKEN_TTL: Duration = Duration::hours(1);

/// Errors from token verification.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token")]
    Invalid,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Invalid,
        }
    }
}

/// Claims carried by access and refresh tokens. The profile fields let
/// the frontend render the signed-in user without a second request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl AccessClaims {
    fn new(user: &User, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// Claims carried by email-verification and password-reset tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailClaims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl EmailClaims {
    fn new(email: &str) -> Self {
        let now = Utc::now();
        Self {
            email: email.to_owned(),
            iat: now.timestamp(),
            exp: (now + EMAIL_TOKEN_TTL).timestamp(),
        }
    }
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }
}

/// Issues and verifies all four token families.
pub struct TokenService {
    access: KeyPair,
    refresh: KeyPair,
    email: KeyPair,
    reset: KeyPair,
}

impl TokenService {
    #[must_use]
    pub fn new(
        access_secret: &SecretString,
        refresh_secret: &SecretString,
        email_secret: &SecretString,
        reset_secret: &SecretString,
    ) -> Self {
        Self {
            access: KeyPair::from_secret(access_secret),
            refresh: KeyPair::from_secret(refresh_secret),
            email: KeyPair::from_secret(email_secret),
            reset: KeyPair::from_secret(reset_secret),
        }
    }

    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if signing fails.
    pub fn issue_access(&self, user: &User) -> Result<String, TokenError> {
        let claims = AccessClaims::new(user, ACCESS_TOKEN_TTL);
        Ok(encode(&Header::default(), &claims, &self.access.encoding)?)
    }

    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if signing fails.
    pub fn issue_refresh(&self, user: &User) -> Result<String, TokenError> {
        let claims = AccessClaims::new(user, REFRESH_TOKEN_TTL);
        Ok(encode(&Header::default(), &claims, &self.refresh.encoding)?)
    }

    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if signing fails.
    pub fn issue_email_verification(&self, email: &str) -> Result<String, TokenError> {
        let claims = EmailClaims::new(email);
        Ok(encode(&Header::default(), &claims, &self.email.encoding)?)
    }

    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if signing fails.
    pub fn issue_password_reset(&self, email: &str) -> Result<String, TokenError> {
        let claims = EmailClaims::new(email);
        Ok(encode(&Header::default(), &claims, &self.reset.encoding)?)
    }

    /// # Errors
    ///
    /// Returns `TokenError::Expired` for an expired token and
    /// `TokenError::Invalid` for any other verification failure.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let data = decode::<AccessClaims>(token, &self.access.decoding, &Validation::default())?;
        Ok(data.claims)
    }

    /// # Errors
    ///
    /// Returns `TokenError::Expired` or `TokenError::Invalid`.
    pub fn verify_refresh(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let data = decode::<AccessClaims>(token, &self.refresh.decoding, &Validation::default())?;
        Ok(data.claims)
    }

    /// # Errors
    ///
    /// Returns `TokenError::Expired` or `TokenError::Invalid`.
    pub fn verify_email_verification(&self, token: &str) -> Result<EmailClaims, TokenError> {
        let data = decode::<EmailClaims>(token, &self.email.decoding, &Validation::default())?;
        Ok(data.claims)
    }

    /// # Errors
    ///
    /// Returns `TokenError::Expired` or `TokenError::Invalid`.
    pub fn verify_password_reset(&self, token: &str) -> Result<EmailClaims, TokenError> {
        let data = decode::<EmailClaims>(token, &self.reset.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use durian_core::UserId;

    fn service() -> TokenService {
        TokenService::new(
            &SecretString::from("access-secret-for-tests-0123456789"),
            &SecretString::from("refresh-secret-for-tests-012345678"),
            &SecretString::from("email-secret-for-tests-0123456789a"),
            &SecretString::from("reset-secret-for-tests-0123456789a"),
        )
    }

    fn test_user() -> User {
        User {
            id: UserId::generate(),
            name: "Pak Jayus".to_owned(),
            username: "pakjayus".to_owned(),
            email: "jayus@example.com".to_owned(),
            password_hash: String::new(),
            is_verified: true,
            email_token: None,
            reset_token: None,
            refresh_token: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn access_token_round_trips() {
        let service = service();
        let user = test_user();
        let token = service.issue_access(&user).unwrap();
        let claims = service.verify_access(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "pakjayus");
        assert_eq!(claims.email, "jayus@example.com");
    }

    #[test]
    fn families_do_not_cross_verify() {
        let service = service();
        let user = test_user();
        let refresh = service.issue_refresh(&user).unwrap();
        assert!(matches!(
            service.verify_access(&refresh),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn email_token_carries_address() {
        let service = service();
        let token = service
            .issue_email_verification("jayus@example.com")
            .unwrap();
        let claims = service.verify_email_verification(&token).unwrap();
        assert_eq!(claims.email, "jayus@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn garbage_is_invalid() {
        let service = service();
        assert!(matches!(
            service.verify_access("not-a-token"),
            Err(TokenError::Invalid)
        ));
    }
}
