//! Integration tests for the Durian Pak Jayus API.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and the API server
//! cargo run -p durian-api
//!
//! # Run integration tests against it
//! API_BASE_URL=http://localhost:3500 \
//! API_TEST_USERNAME=admin API_TEST_PASSWORD=... \
//! cargo test -p durian-integration-tests -- --ignored
//! ```
//!
//! The tests are `#[ignore]`d by default because they need a live
//! server with a verified test account.

use reqwest::Client;
use serde_json::{Value, json};

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3500".to_string())
}

/// HTTP client with a cookie store, so the refresh cookie set by login
/// travels on subsequent requests.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Log in with the test account and return the access token.
///
/// # Panics
///
/// Panics if the login request fails or the response carries no token.
pub async fn login(client: &Client) -> String {
    let username = std::env::var("API_TEST_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let password =
        std::env::var("API_TEST_PASSWORD").unwrap_or_else(|_| "changeme-Admin1".to_string());

    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(resp.status(), 200, "login failed; is the server seeded?");

    let body: Value = resp.json().await.expect("Failed to read login response");
    body["accessToken"]
        .as_str()
        .expect("login response missing accessToken")
        .to_string()
}

/// A one-pixel PNG, enough to pass image validation.
#[must_use]
pub fn tiny_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x62, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}
