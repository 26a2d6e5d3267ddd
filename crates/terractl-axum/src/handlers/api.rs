//! Unauthenticated API metadata and the JSON 404.

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use serde_json::{Value, json};
use terractl_core::services::QuickStatus;

use crate::state::AppState;

/// API name, version and resource map.
pub async fn info() -> Json<Value> {
    Json(json!({
        "name": "terractl API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "auth": "/api/auth",
            "server": "/api/server",
            "worlds": "/api/worlds",
            "backups": "/api/backups",
            "config": "/api/config",
            "logs": "/api/logs",
        },
    }))
}

/// Minimal liveness summary; needs no token.
pub async fn status(State(state): State<AppState>) -> Json<QuickStatus> {
    Json(state.core.status().quick().await)
}

/// Fallback for unknown `/api/*` paths.
pub async fn not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Not Found",
            "message": format!("The requested URL {} was not found", uri.path()),
        })),
    )
}
