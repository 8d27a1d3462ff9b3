//! Integration tests for the content endpoints: categories, tags,
//! products, and the reference bookkeeping between them.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - The API server running (cargo run -p durian-api)
//! - A verified test account (API_TEST_USERNAME / API_TEST_PASSWORD)

use reqwest::{Client, StatusCode, multipart};
use serde_json::Value;
use uuid::Uuid;

use durian_integration_tests::{base_url, client, login, tiny_png};

fn image_part() -> multipart::Part {
    multipart::Part::bytes(tiny_png())
        .file_name("test.png")
        .mime_str("image/png")
        .expect("Failed to build image part")
}

async fn create_category(client: &Client, token: &str, name: &str) -> Uuid {
    let form = multipart::Form::new()
        .text("name", name.to_owned())
        .text("description", "Created by an integration test.")
        .part("file", image_part());
    let resp = client
        .post(format!("{}/categories", base_url()))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to create category");
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Look it up by listing; the create response only carries a message.
    let resp = client
        .get(format!("{}/categories?search={name}", base_url()))
        .send()
        .await
        .expect("Failed to list categories");
    let body: Value = resp.json().await.expect("Failed to read category list");
    body["result"][0]["id"]
        .as_str()
        .expect("category list missing id")
        .parse()
        .expect("category id is not a uuid")
}

async fn delete_category(client: &Client, token: &str, id: Uuid) -> StatusCode {
    client
        .delete(format!("{}/categories/{id}", base_url()))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to delete category")
        .status()
}

#[tokio::test]
#[ignore = "Requires running API server and a seeded test account"]
async fn empty_search_returns_message_envelope() {
    let client = client();
    let needle = Uuid::new_v4();
    let resp = client
        .get(format!("{}/posts?search={needle}", base_url()))
        .send()
        .await
        .expect("Failed to search posts");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to read response");
    assert_eq!(body["message"], "No found post.");
    assert!(body.get("result").is_none());
}

#[tokio::test]
#[ignore = "Requires running API server and a seeded test account"]
async fn category_with_products_cannot_be_deleted() {
    let client = client();
    let token = login(&client).await;

    // Unique names keep reruns from tripping the duplicate check.
    let suffix = &Uuid::new_v4().simple().to_string()[..8];
    let category_name = format!("Fruit {suffix}");
    let product_title = format!("Durian {suffix}");

    let category_id = create_category(&client, &token, &category_name).await;

    let form = multipart::Form::new()
        .text("title", product_title.clone())
        .text("description", "Thorny on the outside.")
        .text("category", category_id.to_string())
        .part("file", image_part());
    let resp = client
        .post(format!("{}/products", base_url()))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::CREATED);

    // The category is now referenced and must refuse deletion.
    assert_eq!(
        delete_category(&client, &token, category_id).await,
        StatusCode::CONFLICT
    );

    // Find the product and remove it.
    let resp = client
        .get(format!("{}/products?search={product_title}", base_url()))
        .send()
        .await
        .expect("Failed to search products");
    let body: Value = resp.json().await.expect("Failed to read product list");
    let product_id = body["result"][0]["id"]
        .as_str()
        .expect("product list missing id");

    let resp = client
        .delete(format!("{}/products/{product_id}", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to delete product");
    assert_eq!(resp.status(), StatusCode::OK);

    // With the last reference gone the category deletes cleanly.
    assert_eq!(
        delete_category(&client, &token, category_id).await,
        StatusCode::OK
    );
}

#[tokio::test]
#[ignore = "Requires running API server and a seeded test account"]
async fn product_create_without_title_is_rejected() {
    let client = client();
    let token = login(&client).await;

    let form = multipart::Form::new()
        .text("description", "No title here.")
        .part("file", image_part());
    let resp = client
        .post(format!("{}/products", base_url()))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to read response");
    assert_eq!(body["message"], "Title is required.");
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn unknown_product_returns_not_found() {
    let resp = client()
        .get(format!("{}/products/{}", base_url(), Uuid::new_v4()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and a seeded test account"]
async fn categories_list_oldest_first() {
    let client = client();
    let token = login(&client).await;

    // A shared suffix scopes the search to just these two rows.
    let suffix = &Uuid::new_v4().simple().to_string()[..8];
    let first = create_category(&client, &token, &format!("Alpha {suffix}")).await;
    let second = create_category(&client, &token, &format!("Beta {suffix}")).await;

    let resp = client
        .get(format!("{}/categories?search={suffix}", base_url()))
        .send()
        .await
        .expect("Failed to list categories");
    let body: Value = resp.json().await.expect("Failed to read category list");
    let ids: Vec<&str> = body["result"]
        .as_array()
        .expect("category list missing result")
        .iter()
        .map(|row| row["id"].as_str().expect("category row missing id"))
        .collect();

    // Reference data lists in creation order, earliest first.
    assert_eq!(ids, vec![first.to_string(), second.to_string()]);

    delete_category(&client, &token, first).await;
    delete_category(&client, &token, second).await;
}

#[tokio::test]
#[ignore = "Requires running API server and a seeded test account"]
async fn product_create_with_unknown_category_is_rejected() {
    let client = client();
    let token = login(&client).await;

    let form = multipart::Form::new()
        .text("title", format!("Orphan check {}", Uuid::new_v4()))
        .text("description", "Created by an integration test.")
        .text("category", Uuid::new_v4().to_string())
        .part("file", image_part());
    let resp = client
        .post(format!("{}/products", base_url()))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = resp.json().await.expect("Failed to read response");
    assert_eq!(body["message"], "Category not found.");
}
