//! Axum application setup.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use super::handlers;
use super::state::AppState;

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    // Local tool: any origin may call the API
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Loading
        .route("/upload", post(handlers::upload_baseline))
        .route(
            "/overlay",
            post(handlers::upload_overlay).delete(handlers::clear_overlay),
        )
        // Dropdowns
        .route("/filters", get(handlers::get_filters))
        .route("/packages", get(handlers::get_packages))
        // Queries
        .route("/query", post(handlers::query))
        .route("/stats", post(handlers::stats))
        // Aggregates
        .route("/metrics", post(handlers::metrics))
        .route("/value-counts", post(handlers::value_counts))
        .route("/breakdown", post(handlers::breakdown))
        .route("/correlation", post(handlers::correlation))
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

/// Start the web server.
pub async fn run_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));

    log::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
