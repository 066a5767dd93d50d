//! Filter dropdown handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use indexmap::IndexMap;
use qcdash::{cascade, ALL};
use serde::{Deserialize, Serialize};

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Response for the filters endpoint.
#[derive(Serialize)]
pub struct FiltersResponse {
    pub categorical_columns: Vec<String>,
    pub numerical_columns: Vec<String>,
    pub identifier_column: Option<String>,
    /// Dropdown options per categorical column, `All` first.
    pub filter_options: IndexMap<String, Vec<String>>,
    /// UI label per column name.
    pub labels: IndexMap<String, String>,
    /// Options for the Type dropdown.
    pub types: Vec<&'static str>,
    pub overlay_loaded: bool,
}

/// GET /api/filters
pub async fn get_filters(State(state): State<AppState>) -> Result<Json<FiltersResponse>, ApiError> {
    let columns = state.dashboard.columns()?;

    let labels = columns
        .categorical
        .iter()
        .chain(&columns.numerical)
        .map(|c| (c.clone(), cascade::display_label(c).to_string()))
        .collect();

    Ok(Json(FiltersResponse {
        labels,
        categorical_columns: columns.categorical,
        numerical_columns: columns.numerical,
        identifier_column: columns.identifier,
        filter_options: columns.filter_options,
        types: cascade::types(),
        overlay_loaded: state.dashboard.has_overlay(),
    }))
}

/// Query parameters for package resolution.
#[derive(Debug, Deserialize)]
pub struct PackagesParams {
    /// Selected Type; defaults to `All`.
    #[serde(rename = "type")]
    pub assay_type: Option<String>,
    /// Currently selected Package, checked against the Type.
    pub package: Option<String>,
}

/// Response for the packages endpoint.
#[derive(Serialize)]
pub struct PackagesResponse {
    #[serde(rename = "type")]
    pub assay_type: String,
    /// Package dropdown options, `All` first.
    pub options: Vec<&'static str>,
    /// Whether the current Package may stay selected; absent if none was sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_valid: Option<bool>,
}

/// GET /api/packages?type=…&package=…
pub async fn get_packages(
    Query(params): Query<PackagesParams>,
) -> Result<Json<PackagesResponse>, ApiError> {
    let assay_type = params.assay_type.unwrap_or_else(|| ALL.to_string());
    let packages = cascade::packages_for(&assay_type)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown type: '{}'", assay_type)))?;

    let options = std::iter::once(ALL).chain(packages.iter().copied()).collect();
    let package_valid = params
        .package
        .as_deref()
        .map(|p| cascade::is_valid(&assay_type, p));

    Ok(Json(PackagesResponse {
        assay_type,
        options,
        package_valid,
    }))
}
