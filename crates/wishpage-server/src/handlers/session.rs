//! Admin login

use super::parse_json;
use crate::middleware::client_identity;
use crate::{AppState, ApiError, ErrorCode};
use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

/// Login payload; `password` is the hex SHA-256 of the admin password
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// POST /login - Exchange the password hash for a bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
) -> Result<Response, ApiError> {
    let client = client_identity(&request);
    let body = to_bytes(request.into_body(), state.config.max_body_size)
        .await
        .map_err(|_| ApiError::new(ErrorCode::InvalidRequest, "Invalid request"))?;
    let login: LoginRequest = parse_json(&body)?;

    if !state.tokens.check_password(&login.password) {
        tracing::warn!(client = %client, "Invalid admin password");
        return Err(ApiError::new(ErrorCode::InvalidPassword, "Invalid password"));
    }

    let issued = state.tokens.issue()?;
    tracing::info!(client = %client, "Login token generated");

    Ok(Json(issued).into_response())
}
