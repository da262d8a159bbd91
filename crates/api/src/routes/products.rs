//! Product route handlers.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bestcart_core::{ProductId, SearchResult, UserId};

use super::params::{json_body, require_user_id};
use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::{NewProduct, Product};
use crate::services::search_products;
use crate::state::AppState;

/// Response body for a created product.
#[derive(Debug, Serialize)]
pub struct ProductCreated {
    pub message: &'static str,
    #[serde(rename = "productId")]
    pub product_id: ProductId,
}

/// Query parameters for product search.
///
/// Both are taken as raw strings so that missing and malformed values get the
/// same `{message}` error body as every other failure.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl SearchParams {
    /// Validate into a trimmed, non-empty query and a user ID.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` naming the offending parameter.
    pub fn validate(&self) -> Result<(&str, UserId)> {
        let query = self
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::BadRequest(r#"A search query "q" is required."#.to_string()))?;

        let user_id = require_user_id(self.user_id.as_deref())?;

        Ok((query, user_id))
    }
}

/// Search products by name, priced for the given user.
#[instrument(skip(state))]
pub async fn search<R: Repository>(
    State(state): State<AppState<R>>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<SearchResult>>> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let (query, user_id) = params.validate()?;

    let results = search_products(state.repo(), query, user_id).await?;
    tracing::info!(query, %user_id, count = results.len(), "Product search");

    Ok(Json(results))
}

/// List all products, ordered by name.
#[instrument(skip(state))]
pub async fn index<R: Repository>(State(state): State<AppState<R>>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.repo().list_products().await?))
}

/// Show one product.
#[instrument(skip(state))]
pub async fn show<R: Repository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let id: ProductId = id.parse()?;

    state
        .repo()
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Product with ID {id} not found")))
}

/// Add a product to the catalog.
#[instrument(skip(state, body))]
pub async fn create<R: Repository>(
    State(state): State<AppState<R>>,
    body: std::result::Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductCreated>)> {
    let product = json_body(body)?;
    if product.name.trim().is_empty() {
        return Err(AppError::BadRequest("Product name is required".to_string()));
    }

    let product_id = state.repo().create_product(&product).await?;
    tracing::info!(%product_id, name = product.name.trim(), "Created product");

    Ok((
        StatusCode::CREATED,
        Json(ProductCreated {
            message: "Product created successfully",
            product_id,
        }),
    ))
}
