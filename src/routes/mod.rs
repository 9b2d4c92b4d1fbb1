mod api;
mod pages;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

use api::{download_file, summary};
use pages::index;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/download/:filename", get(download_file))
        .route("/api/summary", get(summary))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the report locally until Ctrl-C.
pub async fn serve(state: Arc<AppState>) -> std::io::Result<()> {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Results: http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Server stopped");
        })
        .await
}
