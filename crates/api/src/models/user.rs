//! User account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use durian_core::UserId;

/// A registered account.
///
/// The password hash and the stored tokens are server-side state and are
/// skipped on serialization.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(rename = "isVerified")]
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub email_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Public author view embedded in post/product detail responses.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorView {
    pub name: String,
    pub username: String,
    pub email: String,
}

impl From<&User> for AuthorView {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::generate(),
            name: "Pak Jayus".to_owned(),
            username: "pakjayus".to_owned(),
            email: "jayus@durianpakjayus.com".to_owned(),
            password_hash: "$argon2id$v=19$secret".to_owned(),
            is_verified: true,
            email_token: None,
            reset_token: Some("reset".to_owned()),
            refresh_token: Some("refresh".to_owned()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_secret_fields_not_serialized() {
        let json = serde_json::to_string(&sample_user()).expect("serialize");
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("reset"));
        assert!(!json.contains("refresh"));
        assert!(json.contains("\"username\":\"pakjayus\""));
        assert!(json.contains("\"isVerified\":true"));
    }

    #[test]
    fn test_author_view_from_user() {
        let user = sample_user();
        let view = AuthorView::from(&user);
        assert_eq!(view.username, user.username);
        assert_eq!(view.email, user.email);
    }
}
