//! Backup handlers - listing, detail, create, restore, delete, cleanup.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use terractl_core::services::{BackupCreated, CommandReport};
use terractl_core::{BackupDetail, BackupListing};

use super::worlds::ConfirmQuery;
use super::{Success, blocking, optional_json_object, query_number, success};
use crate::error::HttpError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub world: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RestoreQuery {
    pub no_backup: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<BackupListing>, HttpError> {
    let retention = state.core.config().current().backup_retention;
    let limit = query_number(query.limit.as_deref());
    let listing = blocking(&state, move |core| {
        core.inspector()
            .list_backups(query.world.as_deref(), limit, retention)
    })
    .await?;
    Ok(Json(listing))
}

pub async fn get(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<BackupDetail>, HttpError> {
    let detail = blocking(&state, move |core| core.inspector().get_backup(&filename)).await??;
    Ok(Json(detail))
}

/// Run a manual backup. Body (optional): `{world}`.
pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Success<BackupCreated>>), HttpError> {
    let data = optional_json_object(&body)?;
    let world = data.get("world").and_then(Value::as_str);

    let created = state.core.coordinator().create_backup(world).await?;
    Ok((StatusCode::CREATED, success(created)))
}

/// Restore an archive; `?no_backup=true` skips the safety backup.
pub async fn restore(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Query(query): Query<RestoreQuery>,
) -> Result<Json<Success<CommandReport>>, HttpError> {
    let skip = query
        .no_backup
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));
    Ok(success(
        state
            .core
            .coordinator()
            .restore_backup(&filename, skip)
            .await?,
    ))
}

/// Delete an archive; requires `?confirm=true`.
pub async fn remove(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<Success<CommandReport>>, HttpError> {
    Ok(success(
        state
            .core
            .coordinator()
            .delete_backup(&filename, query.confirm.as_deref())
            .await?,
    ))
}

pub async fn cleanup(
    State(state): State<AppState>,
) -> Result<Json<Success<CommandReport>>, HttpError> {
    Ok(success(state.core.coordinator().cleanup_backups().await?))
}
