//! HTTP server bootstrap: bind, serve, shut down on ctrl-c.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::api::router::api_router;
use crate::state::AppState;

pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("API listening on {addr}");

    axum::serve(listener, api_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install ctrl-c handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
