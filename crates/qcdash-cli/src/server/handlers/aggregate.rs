//! Summary metrics, category distributions and correlation handlers.

use axum::{extract::State, Json};
use qcdash::{CorrelationMatrix, GroupBreakdown, MetricsMap, ValueCount};
use serde::{Deserialize, Serialize};

use super::query::FilterRequest;
use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Request body naming the categorical column to group by.
#[derive(Debug, Deserialize)]
pub struct ColumnRequest {
    pub column: String,
    #[serde(flatten)]
    pub selection: FilterRequest,
}

#[derive(Serialize)]
pub struct ValueCountsResponse {
    pub column: String,
    pub counts: Vec<ValueCount>,
}

#[derive(Serialize)]
pub struct BreakdownResponse {
    pub column: String,
    pub groups: Vec<GroupBreakdown>,
}

/// POST /api/metrics
pub async fn metrics(
    State(state): State<AppState>,
    Json(req): Json<FilterRequest>,
) -> Result<Json<MetricsMap>, ApiError> {
    Ok(Json(state.dashboard.metrics(&req.filters, &req.ranges)?))
}

/// POST /api/value-counts
pub async fn value_counts(
    State(state): State<AppState>,
    Json(req): Json<ColumnRequest>,
) -> Result<Json<ValueCountsResponse>, ApiError> {
    let sel = &req.selection;
    let counts = state
        .dashboard
        .value_counts(&sel.filters, &sel.ranges, &req.column)?;
    Ok(Json(ValueCountsResponse {
        column: req.column,
        counts,
    }))
}

/// POST /api/breakdown
pub async fn breakdown(
    State(state): State<AppState>,
    Json(req): Json<ColumnRequest>,
) -> Result<Json<BreakdownResponse>, ApiError> {
    let sel = &req.selection;
    let groups = state
        .dashboard
        .breakdown(&sel.filters, &sel.ranges, &req.column)?;
    Ok(Json(BreakdownResponse {
        column: req.column,
        groups,
    }))
}

/// POST /api/correlation
pub async fn correlation(
    State(state): State<AppState>,
    Json(req): Json<FilterRequest>,
) -> Result<Json<CorrelationMatrix>, ApiError> {
    Ok(Json(state.dashboard.correlation(&req.filters, &req.ranges)?))
}
