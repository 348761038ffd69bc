//! HTTP upload boundary: multipart PDF in, study artifacts out.

pub mod error;
pub mod routes;
pub mod upload;

use crate::rag::RagPipeline;
use axum::extract::DefaultBodyLimit;
use axum::http::header::InvalidHeaderValue;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

/// Largest accepted request body
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Pipeline cloned into every request; only the provider clients are shared.
    pub pipeline: RagPipeline,
    /// Index reuse window for the calls made within one request
    pub index_cache_ttl: Duration,
    /// Where uploads are materialized; the system temp dir when `None`
    pub upload_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(pipeline: RagPipeline, index_cache_ttl: Duration) -> Self {
        AppState {
            pipeline,
            index_cache_ttl,
            upload_dir: None,
        }
    }
}

/// Build the application router with CORS for `allowed_origin`
pub fn router(state: AppState, allowed_origin: &str) -> Result<Router, InvalidHeaderValue> {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin.parse::<HeaderValue>()?)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    let content = Router::new()
        .route("/generate_summary", post(routes::generate_summary))
        .route(
            "/get_key_concept_details",
            post(routes::get_key_concept_details),
        )
        .route("/generate_quizzes", post(routes::generate_quizzes))
        .route("/generate_flashcards", post(routes::generate_flashcards));

    Ok(Router::new()
        .route("/health", get(health))
        .nest("/content", content)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(Arc::new(state)))
}

async fn health() -> &'static str {
    "ok"
}

/// Returns a future that resolves when Ctrl+C is pressed
pub async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
    }
}
