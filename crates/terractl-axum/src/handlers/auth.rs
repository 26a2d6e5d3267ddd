//! Login, token verification and refresh.

use axum::body::Bytes;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;
use serde_json::Value;

use super::json_object;
use crate::auth::{Identity, IssuedToken};
use crate::error::HttpError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Verified {
    pub valid: bool,
    pub username: String,
}

/// Exchange username and password for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<IssuedToken>, HttpError> {
    let data = json_object(&body)?;
    let field = |key: &str| {
        data.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let (username, password) = (field("username"), field("password"));
    if username.is_empty() || password.is_empty() {
        return Err(HttpError::bad_request(
            "Missing credentials",
            "Username and password are required",
        ));
    }

    Ok(Json(state.sessions.login(&username, &password)?))
}

pub async fn verify(Extension(identity): Extension<Identity>) -> Json<Verified> {
    Json(Verified {
        valid: true,
        username: identity.username,
    })
}

/// Issue a fresh token for the current caller.
pub async fn refresh(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Json<IssuedToken> {
    Json(state.sessions.refresh(&identity))
}
