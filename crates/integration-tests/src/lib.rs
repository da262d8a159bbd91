//! Integration tests for BestCart.
//!
//! # Running Tests
//!
//! ```bash
//! # Router tests (in-memory data, no database needed)
//! cargo test -p bestcart-integration-tests
//!
//! # Live-server tests (requires a migrated, seeded database and a running API)
//! cargo run -p bestcart-cli -- migrate
//! cargo run -p bestcart-cli -- seed crates/cli/fixtures/seed.yaml
//! cargo run -p bestcart-api &
//! cargo test -p bestcart-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `product_search` - Search endpoint behavior and pricing
//! - `catalog` - Product, store and user reads and writes, health checks
//! - `shopping_lists` - List CRUD, items and the per-list product view
//! - `middleware` - Request IDs, CORS, request timeout
//! - `live_server` - The same contract against a real server (`#[ignore]`d)

use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use bestcart_api::config::ApiConfig;
use bestcart_api::db::{InMemoryRepository, Repository};
use bestcart_api::routes;
use bestcart_api::state::AppState;

/// Configuration for tests. The database URL is never dialled.
#[must_use]
pub fn test_config() -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("postgres://unused@localhost/bestcart"),
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 0,
        request_timeout: Duration::from_secs(10),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Three stores, three users and a handful of products.
///
/// - Milk: $4.50 at Store A, $5.00 at Store B
/// - Bread: carried nowhere
/// - Oat Milk: $3.99 at Store B
///
/// User 1 has no preferred store, user 2 prefers Store A and user 3 prefers
/// Store C (which carries nothing).
#[must_use]
pub fn grocery() -> InMemoryRepository {
    InMemoryRepository::new()
        .with_store(1, "Store A")
        .with_store(2, "Store B")
        .with_store(3, "Store C")
        .with_user(1, None)
        .with_user(2, Some(1))
        .with_user(3, Some(3))
        .with_product(10, "Milk", Some("Dairy Co"))
        .with_product(11, "Bread", None)
        .with_product(12, "Oat Milk", Some("Oatly"))
        .with_price(10, 1, "4.50")
        .with_price(10, 2, "5.00")
        .with_price(12, 2, "3.99")
}

/// Build the full application over `repo`.
pub fn test_app<R: Repository>(repo: R) -> Router {
    test_app_with_config(test_config(), repo)
}

/// Build the full application with a custom configuration.
pub fn test_app_with_config<R: Repository>(config: ApiConfig, repo: R) -> Router {
    routes::app(AppState::new(config, repo))
}

/// Send one request through the router. Axum routers never fail.
pub async fn send(app: Router, request: Request<Body>) -> Response {
    match app.oneshot(request).await {
        Ok(response) => response,
        Err(infallible) => match infallible {},
    }
}

/// `GET uri` and return the status and raw body text.
///
/// # Panics
///
/// Panics if `uri` is invalid or the body cannot be read.
pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    #[allow(clippy::unwrap_used)]
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = send(app, request).await;
    let status = response.status();

    #[allow(clippy::unwrap_used)]
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

/// `GET uri` and parse the body as JSON.
///
/// # Panics
///
/// Panics if `uri` is invalid or the body is not JSON.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get_text(app, uri).await;

    #[allow(clippy::unwrap_used)]
    let json = serde_json::from_str(&body).unwrap();
    (status, json)
}

/// Send `method uri` with an optional JSON body and parse the JSON response.
///
/// # Panics
///
/// Panics if `uri` is invalid or the response body is not JSON.
pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    #[allow(clippy::unwrap_used)]
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = send(app, request).await;
    let status = response.status();

    #[allow(clippy::unwrap_used)]
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    #[allow(clippy::unwrap_used)]
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

/// Base URL for a live API server (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}
