//! HTTP server facade for bookshelf with Axum, middleware and JSON errors.

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};

use bookshelf_kernel::{settings::Settings, ModuleRegistry};

pub mod error;
pub mod router;

use error::AppError;
use router::RouterBuilder;

/// Start the HTTP server and serve until Ctrl-C or SIGTERM
pub async fn start_server(registry: Arc<ModuleRegistry>, settings: &Settings) -> anyhow::Result<()> {
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    tracing::info!("starting HTTP server on {}", addr);

    let app = build_router(registry, settings);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    tracing::info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main HTTP router with all module routes merged in
pub fn build_router(registry: Arc<ModuleRegistry>, settings: &Settings) -> Router {
    let mut router_builder = RouterBuilder::new();

    for module in registry.modules() {
        router_builder = router_builder.merge_module(module.name(), module.routes());
    }

    let health_registry = Arc::clone(&registry);
    router_builder = router_builder.route(
        "/healthz",
        get(move || {
            let registry = Arc::clone(&health_registry);
            async move { health_check(&registry).await }
        }),
    );

    router_builder
        .with_not_found_fallback()
        .with_timeout(settings.server.request_timeout_ms)
        .with_cors(&settings.cors)
        .with_tracing()
        .with_request_id()
        .build()
}

/// Health check endpoint; asks every module whether it can serve
async fn health_check(registry: &ModuleRegistry) -> Result<&'static str, AppError> {
    registry
        .check_health()
        .await
        .map_err(AppError::unavailable)?;
    Ok("ok")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
