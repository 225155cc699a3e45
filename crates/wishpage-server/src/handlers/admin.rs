//! Authenticated item mutations

use super::{parse_id, parse_json};
use crate::{AppState, ApiError};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use wishpage_store::{ItemPatch, NewItem};

/// POST /admin/insert - Create an item
pub async fn insert_item(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let item: NewItem = parse_json(&body)?;

    let id = state.store.insert(item).await.map_err(|e| {
        tracing::warn!(error = %e, "Cannot insert the item");
        ApiError::from(e)
    })?;

    tracing::info!(id, "Item inserted");
    Ok(StatusCode::OK)
}

/// PUT /admin/update/{id} - Apply a partial update
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&raw_id)?;
    let patch: ItemPatch = parse_json(&body)?;

    state.store.update(id, &patch).await.map_err(|e| {
        tracing::warn!(id, error = %e, "Cannot update the item");
        ApiError::from(e)
    })?;

    tracing::info!(id, fields = ?patch.changed_fields(), "Item updated");
    Ok(StatusCode::OK)
}

/// DELETE /admin/delete/{id} - Remove an item
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&raw_id)?;

    state.store.delete(id).await.map_err(|e| {
        tracing::warn!(id, error = %e, "Cannot delete the item");
        ApiError::from(e)
    })?;

    tracing::info!(id, "Item deleted");
    Ok(StatusCode::OK)
}
