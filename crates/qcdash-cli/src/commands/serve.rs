//! Serve command - run the dashboard JSON API.

use std::path::PathBuf;

use colored::Colorize;
use qcdash::Dashboard;

use super::load_dashboard;
use crate::cli::LoadArgs;
use crate::server::{app, state::AppState};

pub fn run(
    file: Option<PathBuf>,
    overlay: Option<PathBuf>,
    port: u16,
    max_upload_mb: usize,
    load: &LoadArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let dashboard = match &file {
        Some(path) => load_dashboard(path, overlay.as_deref(), load)?,
        None => Dashboard::with_config(load.dashboard_config()?),
    };
    let state = AppState::new(dashboard, max_upload_mb);

    let url = format!("http://localhost:{}", port);
    println!();
    println!(
        "{} {}",
        "Starting dashboard API at".cyan().bold(),
        url.white().bold()
    );
    println!();
    match &file {
        Some(path) => println!("  Baseline: {}", path.display()),
        None => println!("  Baseline: {}", "none (POST /api/upload)".dimmed()),
    }
    if let Some(path) = &overlay {
        println!("  Overlay:  {}", path.display());
    }
    println!("  Upload limit: {} MB", max_upload_mb);
    println!();
    println!("Press {} to stop the server", "Ctrl+C".yellow().bold());
    println!();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(app::run_server(state, port))
}
