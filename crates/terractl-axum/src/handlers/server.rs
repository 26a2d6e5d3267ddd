//! Server handlers - status, health and supervisor lifecycle.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use terractl_core::services::{HealthReport, ProcessAction, ServerStatus};

use super::{Success, success};
use crate::error::HttpError;
use crate::state::AppState;

pub async fn status(State(state): State<AppState>) -> Json<ServerStatus> {
    Json(state.core.status().status().await)
}

/// Health checks; answers 503 when any check is an error.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = state.core.status().health().await;
    let code = if report.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(report))
}

pub async fn start(
    State(state): State<AppState>,
) -> Result<Json<Success<ProcessAction>>, HttpError> {
    Ok(success(state.core.coordinator().start().await?))
}

pub async fn stop(
    State(state): State<AppState>,
) -> Result<Json<Success<ProcessAction>>, HttpError> {
    Ok(success(state.core.coordinator().stop().await?))
}

pub async fn restart(
    State(state): State<AppState>,
) -> Result<Json<Success<ProcessAction>>, HttpError> {
    Ok(success(state.core.coordinator().restart().await?))
}
