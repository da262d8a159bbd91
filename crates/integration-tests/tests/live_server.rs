//! Live-server tests against a running API backed by the seeded database.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database seeded with `crates/cli/fixtures/seed.yaml`
//! - The API server running (cargo run -p bestcart-api)
//!
//! Run with: cargo test -p bestcart-integration-tests -- --ignored

use bestcart_integration_tests::api_base_url;
use reqwest::{Client, StatusCode};
use serde_json::Value;

fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

async fn search(client: &Client, q: &str, user_id: &str) -> (StatusCode, Value) {
    let resp = client
        .get(format!(
            "{}/products/search?q={q}&userId={user_id}",
            api_base_url()
        ))
        .send()
        .await
        .expect("Failed to send search request");

    let status = resp.status();
    let body = resp.json().await.expect("Response was not JSON");
    (status, body)
}

/// Seeded users, in fixture order on a fresh database.
const ALICE: &str = "1";
const BOB: &str = "2";

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_live_health() {
    let resp = client()
        .get(format!("{}/health/ready", api_base_url()))
        .send()
        .await
        .expect("Failed to reach server");

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_live_search_average_price() {
    let (status, body) = search(&client(), "milk", ALICE).await;

    assert_eq!(status, StatusCode::OK);
    let milk = &body[0];
    assert_eq!(milk["name"], "Milk 1L");
    assert_eq!(milk["displayPrice"], "4.75");
    assert_eq!(milk["priceSource"], "average");
    assert_eq!(milk["availability"]["otherStoreCount"], 2);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_live_search_favorite_store_price() {
    let (status, body) = search(&client(), "milk", BOB).await;

    assert_eq!(status, StatusCode::OK);
    let milk = &body[0];
    assert_eq!(milk["displayPrice"], "4.50");
    assert_eq!(milk["priceSource"], "favorite_store");
    assert_eq!(milk["availability"]["isAtFavoriteStore"], true);
    assert_eq!(milk["availability"]["otherStoreCount"], 1);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_live_no_match_and_validation() {
    let client = client();

    let (status, body) = search(&client, "zzz_no_match", ALICE).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Array(Vec::new()));

    let resp = client
        .get(format!("{}/products/search?q=milk", api_base_url()))
        .send()
        .await
        .expect("Failed to send search request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Response was not JSON");
    assert!(body["message"].is_string());
}
