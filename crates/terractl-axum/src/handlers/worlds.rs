//! World handlers - listing, detail, create, delete, copy.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use terractl_core::{WorldCreateRequest, WorldDetail};

use super::{blocking, json_object, optional_json_object};
use crate::error::HttpError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    pub confirm: Option<String>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, HttpError> {
    let worlds = blocking(&state, |core| core.inspector().list_worlds()).await?;
    Ok(Json(json!({
        "count": worlds.len(),
        "worlds": worlds,
    })))
}

pub async fn get(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<WorldDetail>, HttpError> {
    let world = blocking(&state, move |core| core.inspector().get_world(&name)).await??;
    Ok(Json(world))
}

/// Generate a new world. Body: `{name, size?, difficulty?, seed?}`.
pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), HttpError> {
    let data = json_object(&body)?;
    let request = WorldCreateRequest {
        name: data
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        size: data.get("size").and_then(Value::as_i64),
        difficulty: data.get("difficulty").and_then(Value::as_i64),
        seed: data
            .get("seed")
            .and_then(Value::as_str)
            .map(str::to_string),
    };

    let created = state.core.coordinator().create_world(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": created.message,
            "world": {
                "name": created.name,
                "size": created.size,
                "size_code": created.size_code,
                "difficulty": created.difficulty,
            },
        })),
    ))
}

/// Delete a world; `?confirm=` must repeat the world name.
pub async fn remove(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<Value>, HttpError> {
    let deleted = state
        .core
        .coordinator()
        .delete_world(&name, query.confirm.as_deref())
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": deleted.message,
        "name": deleted.name,
        "removed_backup": deleted.removed_backup,
    })))
}

/// Copy a world. Body: `{destination}`.
pub async fn copy(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), HttpError> {
    let data = optional_json_object(&body)?;
    let destination = data.get("destination").and_then(Value::as_str);

    let copied = state
        .core
        .coordinator()
        .copy_world(&name, destination)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": copied.message,
            "world": {
                "name": copied.name,
                "size": copied.size,
                "modified": copied.modified,
            },
        })),
    ))
}
