//! Playlist store handlers.
//!
//! Mutations regenerate the manifest when the store drives playback. A
//! failed regeneration is logged but does not undo the mutation.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use radio_models::{EntryId, NewPlaylistEntry, OrderUpdate, PlaylistEntry};

use crate::auth::AdminKey;
use crate::error::{ApiError, ApiResult};
use crate::services::RegenerateReport;
use crate::state::AppState;

/// Response for a newly added entry.
#[derive(Serialize)]
pub struct AddItemResponse {
    pub message: String,
    pub item: PlaylistEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regenerated: Option<RegenerateReport>,
}

/// Bulk reorder request.
#[derive(Deserialize)]
pub struct ReorderRequest {
    pub items: Option<Vec<OrderUpdate>>,
}

#[derive(Serialize)]
pub struct ReorderResponse {
    pub success: bool,
    pub updated: usize,
}

/// Activation toggle request.
#[derive(Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

/// List active entries in play order.
pub async fn get_playlist(State(state): State<AppState>) -> Json<Vec<PlaylistEntry>> {
    Json(state.store.list_active().await)
}

/// Append an entry to the playlist.
pub async fn add_item(
    State(state): State<AppState>,
    _admin: AdminKey,
    Json(request): Json<NewPlaylistEntry>,
) -> ApiResult<Json<AddItemResponse>> {
    let item = state.store.add(request).await?;
    let regenerated = regenerate_after_change(&state).await;

    Ok(Json(AddItemResponse {
        message: "Item added".to_string(),
        item,
        regenerated,
    }))
}

/// Set the order of several entries at once.
pub async fn reorder_items(
    State(state): State<AppState>,
    _admin: AdminKey,
    Json(request): Json<ReorderRequest>,
) -> ApiResult<Json<ReorderResponse>> {
    let items = request
        .items
        .ok_or_else(|| ApiError::bad_request("items is required"))?;

    let updated = state.store.reorder(&items).await?;
    if updated > 0 {
        regenerate_after_change(&state).await;
    }

    Ok(Json(ReorderResponse {
        success: true,
        updated,
    }))
}

/// Activate or deactivate an entry.
pub async fn set_item_active(
    State(state): State<AppState>,
    _admin: AdminKey,
    Path(id): Path<String>,
    Json(request): Json<SetActiveRequest>,
) -> ApiResult<Json<PlaylistEntry>> {
    let id = Uuid::parse_str(&id)
        .map(EntryId::from)
        .map_err(|_| ApiError::bad_request(format!("invalid entry id: {}", id)))?;

    let item = state.store.set_active(id, request.active).await?;
    regenerate_after_change(&state).await;

    Ok(Json(item))
}

async fn regenerate_after_change(state: &AppState) -> Option<RegenerateReport> {
    match state.radio.playlist_changed().await {
        Ok(report) => report,
        Err(e) => {
            warn!("Playlist changed but the manifest was not regenerated: {}", e);
            None
        }
    }
}
