use anyhow::Result;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{activity, log_event};
use crate::db::ActivityStore;

/// State shared by every request handler
#[derive(Clone)]
pub struct AppState {
    /// Store handle created once at startup
    pub store: Arc<dyn ActivityStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        Self { store }
    }
}

/// Build the activity API router
pub fn build_router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health_check))
        .route("/update_activity", post(activity::update_activity))
        .route("/log_event", post(log_event::log_event))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Bind `addr` and serve the activity API until the token is cancelled
pub async fn run_http_server(
    addr: &str,
    store: Arc<dyn ActivityStore>,
    cancellation_token: CancellationToken,
) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Activity API listening on {}", addr);
    serve_with_listener(listener, store, cancellation_token).await
}

/// Serve on an already bound listener (lets tests pick an ephemeral port)
pub async fn serve_with_listener(
    listener: TcpListener,
    store: Arc<dyn ActivityStore>,
    cancellation_token: CancellationToken,
) -> Result<()> {
    let app = build_router(AppState::new(store));

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancellation_token.cancelled().await;
            info!("HTTP server received shutdown signal");
        })
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))
}

/// Liveness probe. Does not touch the store.
async fn health_check() -> &'static str {
    "OK"
}
