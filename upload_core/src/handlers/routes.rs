//! Route table and the small informational endpoints

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::AppState;

use super::files;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/api/upload", post(files::upload_file))
        .route("/api/files", get(files::list_files))
        .route(
            "/api/files/:id",
            get(files::get_file_info).delete(files::delete_file),
        )
        .route("/api/download/:id", get(files::download_file))
}

async fn handle_root(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "app": state.app_name,
        "version": state.version,
        "message": "Welcome to the file upload service",
        "endpoints": {
            "health": "/health",
            "upload": "/api/upload",
            "files": "/api/files",
            "file": "/api/files/{id}",
            "download": "/api/download/{id}"
        }
    }))
}

async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().timestamp(),
        "files_stored": state.file_service.count_files(),
    }))
}
