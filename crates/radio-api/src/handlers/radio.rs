//! Station control handlers.

use axum::extract::State;
use axum::Json;

use radio_models::{EncoderStatus, SyncReport};

use crate::auth::AdminKey;
use crate::error::ApiResult;
use crate::services::RegenerateReport;
use crate::state::AppState;

/// Download the remote library into the cache.
pub async fn sync_library(
    State(state): State<AppState>,
    _admin: AdminKey,
) -> ApiResult<Json<SyncReport>> {
    Ok(Json(state.radio.sync_library().await?))
}

/// Rebuild the manifest and restart the encoder onto it.
pub async fn regenerate_playlist(
    State(state): State<AppState>,
    _admin: AdminKey,
) -> ApiResult<Json<RegenerateReport>> {
    Ok(Json(state.radio.regenerate().await?))
}

/// Sync, regenerate and restart in one step.
pub async fn refresh_radio(
    State(state): State<AppState>,
    _admin: AdminKey,
) -> ApiResult<Json<RegenerateReport>> {
    Ok(Json(state.radio.refresh().await?))
}

pub async fn start_radio(
    State(state): State<AppState>,
    _admin: AdminKey,
) -> ApiResult<Json<EncoderStatus>> {
    Ok(Json(state.radio.start().await?))
}

pub async fn stop_radio(State(state): State<AppState>, _admin: AdminKey) -> Json<EncoderStatus> {
    Json(state.radio.stop().await)
}

pub async fn radio_status(State(state): State<AppState>) -> Json<EncoderStatus> {
    Json(state.radio.status())
}
