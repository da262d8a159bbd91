//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database ping)
//!
//! # Products
//! GET  /products               - Product listing
//! POST /products               - Add a product
//! GET  /products/search        - Search with per-user pricing
//! GET  /products/{id}          - Product detail
//!
//! # Stores
//! GET  /stores                 - Store listing
//! POST /stores                 - Add a store
//! GET  /stores/{id}            - Store detail
//!
//! # Users
//! GET  /users/{id}             - User detail
//!
//! # Shopping lists (all take ?userId=)
//! GET    /shopping-lists                 - The user's lists
//! POST   /shopping-lists                 - Create a list
//! GET    /shopping-lists/{id}            - List detail
//! PUT    /shopping-lists/{id}            - Partial update
//! DELETE /shopping-lists/{id}            - Delete with its items
//! POST   /shopping-lists/{id}/items      - Add a product, returns the item
//! GET    /shopping-lists/{id}/products   - Items with display department and units
//! POST   /shopping-lists/{id}/products   - Add a product, returns the product view
//! ```

pub mod health;
pub mod params;
pub mod products;
pub mod shopping_lists;
pub mod stores;
pub mod users;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::db::Repository;
use crate::middleware::{cors_layer, request_id_middleware};
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes<R: Repository>() -> Router<AppState<R>> {
    Router::new()
        .route("/", get(products::index::<R>).post(products::create::<R>))
        .route("/search", get(products::search::<R>))
        .route("/{id}", get(products::show::<R>))
}

/// Create the store routes router.
pub fn store_routes<R: Repository>() -> Router<AppState<R>> {
    Router::new()
        .route("/", get(stores::index::<R>).post(stores::create::<R>))
        .route("/{id}", get(stores::show::<R>))
}

/// Create the user routes router.
pub fn user_routes<R: Repository>() -> Router<AppState<R>> {
    Router::new().route("/{id}", get(users::show::<R>))
}

/// Create the shopping list routes router.
pub fn shopping_list_routes<R: Repository>() -> Router<AppState<R>> {
    Router::new()
        .route(
            "/",
            get(shopping_lists::index::<R>).post(shopping_lists::create::<R>),
        )
        .route(
            "/{id}",
            get(shopping_lists::show::<R>)
                .put(shopping_lists::update::<R>)
                .delete(shopping_lists::destroy::<R>),
        )
        .route("/{id}/items", post(shopping_lists::add_list_item::<R>))
        .route(
            "/{id}/products",
            get(shopping_lists::list_products::<R>).post(shopping_lists::add_product::<R>),
        )
}

/// Create all API routes.
pub fn routes<R: Repository>() -> Router<AppState<R>> {
    Router::new()
        .route("/health", get(health::live))
        .route("/health/ready", get(health::ready::<R>))
        .nest("/products", product_routes())
        .nest("/stores", store_routes())
        .nest("/users", user_routes())
        .nest("/shopping-lists", shopping_list_routes())
}

/// Build the complete application with its middleware stack.
///
/// Sentry layers are not included; `main` adds them outermost.
pub fn app<R: Repository>(state: AppState<R>) -> Router {
    let timeout = state.config().request_timeout;

    routes()
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(TimeoutLayer::new(timeout))
        .layer(cors_layer())
        .with_state(state)
}
