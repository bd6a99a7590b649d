//! HTTP REST front-end for opshub.
//!
//! One router per service nested under `/api`, sharing the same provider
//! set as the MCP front-end. Serves until ctrl-c.

use anyhow::Context as _;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use opshub_core::Services;

pub mod error;
mod repos;
mod telemetry;
mod testplans;
mod workitems;

#[cfg(test)]
mod testutil;

/// Build the full API router.
pub fn router(services: Services) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/work-items", workitems::router())
        .nest("/api/repositories", repos::router())
        .nest("/api/test-plans", testplans::router())
        .nest("/api/telemetry", telemetry::router())
        .with_state(services)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Bind and serve the API until ctrl-c.
pub async fn serve(bind_addr: &str, services: Services) -> anyhow::Result<()> {
    let app = router(services);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("bind {}", bind_addr))?;
    let local = listener
        .local_addr()
        .with_context(|| format!("local addr {}", bind_addr))?;

    tracing::info!(addr = %local, "HTTP server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server exited")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutdown signal received");
    }
}
