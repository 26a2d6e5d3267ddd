//! Settings handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde_json::{Value, json};
use terractl_core::SettingsView;

use super::json_object;
use crate::error::HttpError;
use crate::state::AppState;

pub async fn get(State(state): State<AppState>) -> Json<SettingsView> {
    Json(state.core.config().view())
}

/// Apply a partial settings update.
pub async fn update(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, HttpError> {
    let patch = json_object(&body)?;
    let outcome = state.core.config().update(&patch)?;
    let names: Vec<&str> = outcome.updated.iter().map(|k| k.as_str()).collect();

    Ok(Json(json!({
        "success": true,
        "message": format!("Updated: {}", names.join(", ")),
        "updated": outcome.updated,
        "restart_required": outcome.restart_required,
    })))
}

/// The runtime config file generated at server start.
pub async fn runtime(State(state): State<AppState>) -> Result<Json<Value>, HttpError> {
    let runtime = state.core.config().runtime().await?;
    if runtime.exists {
        Ok(Json(json!({
            "exists": true,
            "path": runtime.path,
            "content": runtime.content,
        })))
    } else {
        Ok(Json(json!({
            "exists": false,
            "path": runtime.path,
            "message": "Runtime config not yet generated",
        })))
    }
}
