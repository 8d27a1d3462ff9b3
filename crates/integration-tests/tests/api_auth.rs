//! Integration tests for the authentication lifecycle.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - The API server running (cargo run -p durian-api)
//! - A verified test account (API_TEST_USERNAME / API_TEST_PASSWORD)

use reqwest::StatusCode;
use serde_json::{Value, json};

use durian_integration_tests::{base_url, client, login};

#[tokio::test]
#[ignore = "Requires running API server and a seeded test account"]
async fn login_sets_refresh_cookie_and_returns_access_token() {
    let client = client();
    let token = login(&client).await;
    assert!(!token.is_empty());

    // The cookie store picked up the refresh cookie; /auth/refresh must
    // now mint a fresh access token without credentials.
    let resp = client
        .get(format!("{}/auth/token", base_url()))
        .send()
        .await
        .expect("Failed to send refresh request");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to read refresh response");
    assert!(body["accessToken"].is_string());
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn login_with_bad_password_is_rejected_generically() {
    let client = client();
    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({ "username": "admin", "password": "definitely-wrong" }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to read response");
    assert_eq!(body["message"], "Incorrect username or password.");
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn refresh_without_cookie_is_unauthorized() {
    // Fresh client, no cookie store contents.
    let resp = client()
        .get(format!("{}/auth/token", base_url()))
        .send()
        .await
        .expect("Failed to send refresh request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn protected_route_requires_bearer_token() {
    let resp = client()
        .get(format!("{}/users", base_url()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client()
        .get(format!("{}/users", base_url()))
        .header("Authorization", "Bearer not-a-real-token")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running API server and a seeded test account"]
async fn logout_clears_the_session() {
    let client = client();
    let _token = login(&client).await;

    let resp = client
        .delete(format!("{}/auth/logout", base_url()))
        .send()
        .await
        .expect("Failed to send logout request");
    assert_eq!(resp.status(), StatusCode::OK);

    // The stored refresh token is gone server-side.
    let resp = client
        .get(format!("{}/auth/token", base_url()))
        .send()
        .await
        .expect("Failed to send refresh request");
    assert!(
        resp.status() == StatusCode::UNAUTHORIZED || resp.status() == StatusCode::FORBIDDEN,
        "refresh should fail after logout, got {}",
        resp.status()
    );
}
