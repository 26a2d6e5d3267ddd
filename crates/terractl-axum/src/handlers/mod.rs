//! HTTP handlers, one module per resource.
//!
//! Handlers are thin: parse the request, call the core facade, shape JSON.

pub mod api;
pub mod auth;
pub mod backups;
pub mod config;
pub mod logs;
pub mod server;
pub mod worlds;

use std::sync::Arc;

use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};
use terractl_core::AppCore;

use crate::error::HttpError;
use crate::state::AppState;

/// `{success: true, ...}` around a serializable result.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    success: bool,
    #[serde(flatten)]
    inner: T,
}

pub fn success<T: Serialize>(inner: T) -> Json<Success<T>> {
    Json(Success {
        success: true,
        inner,
    })
}

/// Run a synchronous directory scan or archive read on the blocking pool.
pub(crate) async fn blocking<T, F>(state: &AppState, scan: F) -> Result<T, HttpError>
where
    F: FnOnce(&AppCore) -> T + Send + 'static,
    T: Send + 'static,
{
    let core = Arc::clone(&state.core);
    tokio::task::spawn_blocking(move || scan(&core))
        .await
        .map_err(|e| HttpError::Internal {
            error: "Storage error",
            message: "Filesystem scan failed".to_string(),
            detail: e.to_string(),
        })
}

/// Parse a request body that must be a JSON object.
pub(crate) fn json_object(body: &[u8]) -> Result<Map<String, Value>, HttpError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(HttpError::bad_request(
            "Invalid request",
            "Request body must be JSON",
        )),
    }
}

/// Like [`json_object`], but an empty body is an empty object.
pub(crate) fn optional_json_object(body: &[u8]) -> Result<Map<String, Value>, HttpError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        Ok(Map::new())
    } else {
        json_object(body)
    }
}

/// Lenient numeric query parameter: anything unparsable counts as absent.
pub(crate) fn query_number(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|v| v.trim().parse().ok())
}
