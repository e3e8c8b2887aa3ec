//! HTTP route definitions

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;
use super::AppState;

/// Create the router with all routes
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/start-analysis", post(handlers::start_analysis))
        .route("/api/job-status/:job_id", get(handlers::job_status))
        .route("/api/download-csv/:job_id", get(handlers::download_csv))
        .with_state(app_state)
}
