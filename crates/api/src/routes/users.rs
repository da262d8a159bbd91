//! User route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use bestcart_core::UserId;

use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::state::AppState;

/// Show one user, including their preferred store.
#[instrument(skip(state))]
pub async fn show<R: Repository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    let id: UserId = id.parse()?;

    state
        .repo()
        .get_user(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("User with ID {id} not found")))
}
