//! HTTP surface (axum).
//!
//! `POST /generate-image` runs the pipeline; `GET /` and `GET /health` are
//! informational. Boundary concerns are layered around the routes here so the
//! handlers only see validated requests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware as mw, Router};
use log::info;

use crate::config::BoundaryConfig;
use crate::{Pipeline, ServiceConfig};

pub mod error;
pub mod handlers;
pub mod middleware;

pub use error::ApiError;
pub use middleware::RateLimiter;

/// Shared, read-only handler state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub api_key: Option<Arc<str>>,
    pub limiter: Option<Arc<RateLimiter>>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, boundary: &BoundaryConfig) -> Self {
        let limiter = boundary
            .rate_limit_enabled
            .then(|| Arc::new(RateLimiter::new(boundary.rate_limit_per_minute, boundary.rate_limit_per_hour)));
        Self {
            pipeline: Arc::new(pipeline),
            api_key: boundary.api_key.as_deref().map(Arc::from),
            limiter,
        }
    }
}

/// Build the full router with every boundary layer applied.
pub fn router(pipeline: Pipeline, boundary: &BoundaryConfig) -> Router {
    let state = AppState::new(pipeline, boundary);

    // Layers added last run first: rate limit, then API key
    let generate = Router::new()
        .route("/generate-image", post(handlers::generate_image))
        .route_layer(mw::from_fn_with_state(state.clone(), middleware::require_api_key))
        .route_layer(mw::from_fn_with_state(state.clone(), middleware::rate_limit));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(generate)
        .layer(DefaultBodyLimit::max(boundary.max_body_bytes))
        .layer(middleware::cors_layer(boundary))
        .layer(mw::from_fn(middleware::security_headers))
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: ServiceConfig, pipeline: Pipeline) -> std::io::Result<()> {
    let app = router(pipeline, &config.boundary);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
