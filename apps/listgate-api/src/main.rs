//! Listgate API
//!
//! A synchronous HTTP gateway that translates a small REST surface
//! into operations against a remote list-oriented store. Each request
//! opens its own authenticated store session.

mod config;
mod logging;

use std::net::SocketAddr;

use axum::{routing::get, Json, Router};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

use listgate_api_lists::{lists_router, ListsState};

use config::Config;

fn main() {
    // Load configuration (fail-fast on missing required values)
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.log_level);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .enable_all()
        .build()
    {
        Ok(r) => r,
        Err(e) => {
            eprintln!("FATAL: Failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    runtime.block_on(serve(config));
}

async fn serve(config: Config) {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.port,
        store = %config.store_url,
        "Starting listgate API"
    );

    let state = ListsState::new(config.store_config())
        .with_field_keys(config.field_keys())
        .with_skip_soft_deleted(!config.process_deleted)
        .with_page_size(config.page_size);

    let app = Router::new()
        .route("/health", get(health_handler))
        .merge(lists_router(state))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };
    info!(%addr, "Listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {e}");
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
