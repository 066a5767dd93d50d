//! Filtered query and statistics handlers.

use axum::{extract::State, Json};
use qcdash::{FilterSpec, QueryResult, RangeSpec, StatsMap};
use serde::Deserialize;

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Request body shared by the query, stats and aggregate endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct FilterRequest {
    /// Column → selected value; `"All"`, `""` and `null` leave a column unconstrained.
    #[serde(default)]
    pub filters: FilterSpec,
    /// Numerical column → `{ "min": .., "max": .. }`, both inclusive and optional.
    #[serde(default)]
    pub ranges: RangeSpec,
}

/// POST /api/query
pub async fn query(
    State(state): State<AppState>,
    Json(req): Json<FilterRequest>,
) -> Result<Json<QueryResult>, ApiError> {
    Ok(Json(state.dashboard.query_within(&req.filters, &req.ranges)?))
}

/// POST /api/stats
pub async fn stats(
    State(state): State<AppState>,
    Json(req): Json<FilterRequest>,
) -> Result<Json<StatsMap>, ApiError> {
    Ok(Json(state.dashboard.stats_within(&req.filters, &req.ranges)?))
}
