//! Local HTTP API over the prediction service and the tile stitcher.

mod error;
mod handlers;
mod state;

use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use engine_logging::engine_info;

pub use error::{ApiError, ApiResult};
pub use state::ServerState;

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/predictions", post(handlers::create_prediction))
        .route("/api/predictions/list", get(handlers::list_predictions))
        .route("/api/predictions/{id}", get(handlers::get_prediction))
        .route("/api/og", get(handlers::og_preview))
        .route("/api/export", get(handlers::export_wallpaper))
        .with_state(state)
}

/// Bind `host:port` and serve until Ctrl-C.
pub async fn serve(state: ServerState, host: &str, port: u16) -> anyhow::Result<()> {
    let ip: IpAddr = host
        .parse()
        .with_context(|| format!("invalid host {host:?}"))?;
    let addr = SocketAddr::new(ip, port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind {addr}"))?;
    engine_info!("Listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    engine_info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    engine_info!("Shutdown signal received");
}
