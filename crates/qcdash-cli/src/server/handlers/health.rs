//! Health check handler.

use axum::{extract::State, Json};
use qcdash::SourceMetadata;
use serde::Serialize;

use crate::server::state::AppState;

/// Response for the health endpoint.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub baseline: Option<SourceMetadata>,
    pub overlay: Option<SourceMetadata>,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (baseline, overlay) = match state.dashboard.sources() {
        Ok((baseline, overlay)) => (Some(baseline), overlay),
        Err(_) => (None, None),
    };

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        baseline,
        overlay,
    })
}
