//! HTTP boundary: exposes the predictor over JSON.

mod dto;
mod handlers;
mod routes;

pub use handlers::AppState;
pub use routes::router;

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::CliError;

/// Bind and serve until Ctrl-C.
pub async fn serve(
    addr: SocketAddr,
    state: AppState,
    request_timeout: Duration,
) -> Result<(), CliError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, router(state, request_timeout))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
    }
}
