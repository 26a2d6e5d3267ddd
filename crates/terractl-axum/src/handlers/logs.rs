//! Log handlers - listing, windowed reads, search, clear.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use terractl_core::{LogListing, LogSearchResult, LogWindow};

use super::worlds::ConfirmQuery;
use super::{blocking, query_number};
use crate::error::HttpError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ReadQuery {
    pub lines: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub log: Option<String>,
    pub limit: Option<String>,
}

/// A log window plus its lines joined for display.
#[derive(Debug, Serialize)]
pub struct LogContent {
    #[serde(flatten)]
    pub window: LogWindow,
    pub content: String,
    pub lines_returned: usize,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<LogListing>, HttpError> {
    let listing = blocking(&state, |core| core.logs().list()).await?;
    Ok(Json(listing))
}

/// `?lines=` window (default 100, max 1000), `?offset=` 0 for tail.
pub async fn read(
    State(state): State<AppState>,
    Path(log_type): Path<String>,
    Query(query): Query<ReadQuery>,
) -> Result<Json<LogContent>, HttpError> {
    let window = state
        .core
        .logs()
        .read(
            &log_type,
            query_number(query.lines.as_deref()),
            query_number(query.offset.as_deref()),
        )
        .await?;
    Ok(Json(LogContent {
        content: window.lines.join("\n"),
        lines_returned: window.lines.len(),
        window,
    }))
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<LogSearchResult>, HttpError> {
    Ok(Json(
        state
            .core
            .logs()
            .search(
                query.q.as_deref().unwrap_or_default(),
                query.log.as_deref(),
                query_number(query.limit.as_deref()),
            )
            .await?,
    ))
}

/// Truncate a clearable log; requires `?confirm=true`.
pub async fn clear(
    State(state): State<AppState>,
    Path(log_type): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<Value>, HttpError> {
    let cleared = state
        .core
        .logs()
        .clear(&log_type, query.confirm.as_deref())
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Log '{}' cleared", cleared.filename),
        "log_type": cleared.log_type,
        "filename": cleared.filename,
    })))
}
