//! CLI command implementations.

pub mod breakdown;
pub mod correlation;
pub mod packages;
pub mod query;
pub mod serve;
pub mod summary;

use std::path::Path;

use qcdash::Dashboard;

use crate::cli::LoadArgs;

/// Build a dashboard and load the baseline plus an optional overlay.
pub fn load_dashboard(
    file: &Path,
    overlay: Option<&Path>,
    load: &LoadArgs,
) -> Result<Dashboard, Box<dyn std::error::Error>> {
    let dashboard = Dashboard::with_config(load.dashboard_config()?);
    dashboard.load_baseline_path(file)?;
    if let Some(path) = overlay {
        dashboard.load_overlay_path(path)?;
    }
    Ok(dashboard)
}
