//! Service-level handlers

use crate::{ApiError, ErrorCode};
use axum::{http::StatusCode, response::IntoResponse};

/// GET /health - Health check
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Item routes hit without an id, e.g. `PUT /reserve/`
pub async fn missing_id() -> ApiError {
    ApiError::new(ErrorCode::MissingId, "Missing ID in the path")
}
