//! Store route handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use bestcart_core::StoreId;

use super::params::json_body;
use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::{NewStore, Store};
use crate::state::AppState;

/// Response body for a created store.
#[derive(Debug, Serialize)]
pub struct StoreCreated {
    pub message: &'static str,
    #[serde(rename = "storeId")]
    pub store_id: StoreId,
}

/// List all stores, ordered by name.
#[instrument(skip(state))]
pub async fn index<R: Repository>(State(state): State<AppState<R>>) -> Result<Json<Vec<Store>>> {
    Ok(Json(state.repo().list_stores().await?))
}

/// Show one store.
#[instrument(skip(state))]
pub async fn show<R: Repository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<Json<Store>> {
    let id: StoreId = id.parse()?;

    state
        .repo()
        .get_store(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Store with ID {id} not found")))
}

/// Add a store. Store names are unique; a taken name is `409`.
#[instrument(skip(state, body))]
pub async fn create<R: Repository>(
    State(state): State<AppState<R>>,
    body: std::result::Result<Json<NewStore>, JsonRejection>,
) -> Result<(StatusCode, Json<StoreCreated>)> {
    let store = json_body(body)?;
    if store.name.trim().is_empty() {
        return Err(AppError::BadRequest("Store name is required".to_string()));
    }

    let store_id = state.repo().create_store(&store).await?;
    tracing::info!(%store_id, name = store.name.trim(), "Created store");

    Ok((
        StatusCode::CREATED,
        Json(StoreCreated {
            message: "Store created successfully",
            store_id,
        }),
    ))
}
