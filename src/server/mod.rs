//! HTTP boundary
//!
//! Axum server exposing job submission, status polling and CSV download.
//! Handlers only talk to the shared [`JobRegistry`].

mod handlers;
mod routes;
mod types;

pub use routes::create_router;
pub use types::{ErrorResponse, HealthResponse, JobStartedResponse, StartAnalysisRequest};

use crate::config::Config;
use crate::job::JobRegistry;
use axum::http::Method;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<JobRegistry>,
    pub vdp_limit: usize,
    pub download_prefix: String,
}

impl AppState {
    pub fn new(registry: Arc<JobRegistry>, config: &Config) -> Self {
        Self {
            registry,
            vdp_limit: config.scraper.vdp_limit,
            download_prefix: config.output.download_prefix.clone(),
        }
    }
}

/// Builds the full application: routes plus CORS and request tracing
pub fn build_app(state: AppState, cors_enabled: bool) -> axum::Router {
    let mut app = create_router(state);

    if cors_enabled {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
            .allow_origin(Any);
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http())
}

/// Serves HTTP on `addr` until `shutdown` resolves
///
/// # Returns
///
/// * `Ok(())` - The server shut down gracefully
/// * `Err(std::io::Error)` - Binding or serving failed
pub async fn serve<F>(
    addr: SocketAddr,
    state: AppState,
    cors_enabled: bool,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(state, cors_enabled);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("HTTP server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("HTTP server shutting down");
        })
        .await
}
