//! Core library for the HTTP file upload service: file bookkeeping,
//! route handlers, configuration, and error types.

pub mod config;
pub mod error;
pub mod files;
pub mod handlers;
pub mod middleware;

pub use config::{AppConfig, ServerConfig, StorageConfig};
pub use error::{AppError, Result};
pub use files::{FileRecord, FileRegistry, FileService, FileStore, FileUpload, UploadValidator};
pub use handlers::create_routes;

use axum::{extract::DefaultBodyLimit, http::Request, Router};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, Span};

/// Headroom for multipart boundaries and part headers on top of the
/// configured file size cap, so the service's own validator is the
/// authority on oversized uploads.
const MULTIPART_ENVELOPE_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub file_service: FileService,
}

impl AppState {
    pub fn new(file_service: FileService) -> Self {
        Self {
            app_name: "File Upload Service".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            file_service,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = (state.file_service.max_file_size() as usize)
        .saturating_add(MULTIPART_ENVELOPE_OVERHEAD);

    // Built inline so the closure types stay inferable where the layer
    // is applied.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
                query = ?request.uri().query(),
            )
        })
        .on_response(
            |response: &axum::http::Response<_>, latency: Duration, _span: &Span| {
                let status = response.status();
                let latency_ms = latency.as_millis();

                if status.is_success() {
                    tracing::info!(
                        status = status.as_u16(),
                        latency_ms = latency_ms,
                        "request completed"
                    );
                } else if status.is_client_error() {
                    tracing::warn!(
                        status = status.as_u16(),
                        latency_ms = latency_ms,
                        "client error response"
                    );
                } else {
                    tracing::error!(
                        status = status.as_u16(),
                        latency_ms = latency_ms,
                        "server error response"
                    );
                }
            },
        );

    Router::new()
        .merge(create_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::cors::cors_layer())
        .layer(trace_layer)
        .with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
