//! Upload handlers for the baseline and overlay tables.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use qcdash::{LoadSummary, OverlaySummary};
use serde::{Deserialize, Serialize};

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Query parameters for uploads.
#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    /// Uploaded file name; its extension picks the reader.
    pub filename: Option<String>,
}

/// Response after removing the overlay.
#[derive(Serialize)]
pub struct OverlayClearedResponse {
    /// Whether an overlay was loaded before the request.
    pub cleared: bool,
}

/// POST /api/upload
///
/// Replaces the baseline with the request body and discards any overlay.
pub async fn upload_baseline(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<LoadSummary>, ApiError> {
    let dashboard = Arc::clone(&state.dashboard);
    let summary = tokio::task::spawn_blocking(move || {
        dashboard.load_baseline_bytes(&body, params.filename.as_deref())
    })
    .await??;

    Ok(Json(summary))
}

/// POST /api/overlay
pub async fn upload_overlay(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<OverlaySummary>, ApiError> {
    let dashboard = Arc::clone(&state.dashboard);
    let summary = tokio::task::spawn_blocking(move || {
        dashboard.load_overlay_bytes(&body, params.filename.as_deref())
    })
    .await??;

    Ok(Json(summary))
}

/// DELETE /api/overlay
pub async fn clear_overlay(State(state): State<AppState>) -> Json<OverlayClearedResponse> {
    let cleared = state.dashboard.clear_overlay();
    Json(OverlayClearedResponse { cleared })
}
