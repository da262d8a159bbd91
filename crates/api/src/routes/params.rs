//! Request extraction shared by several handlers.
//!
//! Extractor rejections are turned into `AppError::BadRequest` so that every
//! client error carries the same `{message}` body.

use axum::{
    Json,
    extract::{
        Query,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::Deserialize;

use bestcart_core::UserId;

use crate::error::{AppError, Result};

/// Message for a missing or malformed `userId`.
pub const USER_ID_REQUIRED: &str = r#"A valid "userId" is required."#;

/// Parse a raw `userId` value: trimmed, whole `i32`.
///
/// # Errors
///
/// Returns `AppError::BadRequest` when the value is missing or malformed.
pub fn require_user_id(raw: Option<&str>) -> Result<UserId> {
    raw.and_then(|id| id.parse::<UserId>().ok())
        .ok_or_else(|| AppError::BadRequest(USER_ID_REQUIRED.to_string()))
}

/// `?userId=` for routes that act on behalf of a user.
#[derive(Debug, Default, Deserialize)]
pub struct UserParams {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl UserParams {
    /// Unwrap the query extractor and validate the user ID.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a malformed query string or user ID.
    pub fn user_id(
        params: std::result::Result<Query<Self>, QueryRejection>,
    ) -> Result<UserId> {
        let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
        require_user_id(params.user_id.as_deref())
    }
}

/// Unwrap a JSON body extractor.
///
/// # Errors
///
/// Returns `AppError::BadRequest` with the rejection text (bad JSON, wrong
/// content type, missing fields).
pub fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}
