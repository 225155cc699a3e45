//! Public item handlers: listing and reservation

use super::parse_id;
use crate::{AppState, ApiError};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use wishpage_store::Item;

/// GET /items - All items, cheapest first
///
/// A store failure still answers with an empty array, under a 500 status.
pub async fn list_items(State(state): State<Arc<AppState>>) -> Response {
    let listing = state.store.list().await;

    match listing.error {
        None => Json(listing.items).into_response(),
        Some(e) => {
            tracing::error!(error = %e, "Cannot get the items");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(Vec::<Item>::new())).into_response()
        }
    }
}

/// PUT /reserve/{id} - Take one unit, answer with the remaining count
pub async fn reserve_item(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&raw_id)?;

    let remaining = state.store.reserve(id).await.map_err(|e| {
        tracing::warn!(id, error = %e, "Cannot reserve the item");
        ApiError::from(e)
    })?;

    tracing::info!(id, remaining, "Item reserved");
    Ok((
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        remaining.to_string(),
    )
        .into_response())
}
