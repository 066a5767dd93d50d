//! Application state for the web server.

use std::sync::Arc;

use qcdash::Dashboard;

/// Bytes in a megabyte, for upload limits.
const MEGABYTE: usize = 1024 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The dashboard every request reads from and loads into.
    pub dashboard: Arc<Dashboard>,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create new application state.
    pub fn new(dashboard: Dashboard, max_upload_mb: usize) -> Self {
        Self {
            dashboard: Arc::new(dashboard),
            max_upload_bytes: max_upload_mb.saturating_mul(MEGABYTE),
        }
    }
}
