//! Bearer-token sessions and the authentication middleware.
//!
//! Tokens are random UUIDs kept in memory with an expiry; restarting the
//! server invalidates every session. The middleware accepts either
//! `Authorization: Bearer <token>` or `X-API-Token: <token>` and injects the
//! verified [`Identity`] into request extensions.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::config::AuthConfig;
use crate::state::AppState;

/// Alternative header carrying the raw token.
pub const API_TOKEN_HEADER: &str = "x-api-token";

/// Authentication failures. All of them answer 401.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("No token provided. Use Authorization: Bearer <token> or X-API-Token header.")]
    MissingToken,

    #[error("Your authentication token has expired. Please log in again.")]
    Expired,

    #[error("Token is not recognized")]
    InvalidToken,

    #[error("Invalid username or password")]
    BadCredentials,
}

impl AuthError {
    const fn label(&self) -> &'static str {
        match self {
            Self::MissingToken => "Authentication required",
            Self::Expired => "Token expired",
            Self::InvalidToken => "Invalid token",
            Self::BadCredentials => "Authentication failed",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "success": false,
            "error": self.label(),
            "message": self.to_string(),
        });
        let mut res = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        res.headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        res
    }
}

/// The authenticated caller, available to handlers as an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

/// A freshly issued token.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
    pub username: String,
}

#[derive(Debug, Clone)]
struct Session {
    username: String,
    expires_at: DateTime<Utc>,
}

/// In-memory session table for the single configured user.
pub struct SessionStore {
    credentials: AuthConfig,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(credentials: AuthConfig) -> Self {
        Self {
            credentials,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Check credentials and issue a token.
    ///
    /// An unset password never authenticates.
    pub fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let expected = &self.credentials;
        if expected.password.is_empty()
            || username != expected.username
            || password != expected.password
        {
            tracing::warn!(username, "Rejected login");
            return Err(AuthError::BadCredentials);
        }
        tracing::info!(username, "User logged in");
        Ok(self.issue(username))
    }

    /// Resolve a token to its identity.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Issue a new token for an already verified caller. The previous token
    /// stays valid until it expires.
    pub fn refresh(&self, identity: &Identity) -> IssuedToken {
        self.issue(&identity.username)
    }

    /// Number of live sessions.
    pub fn active_sessions(&self) -> usize {
        let now = Utc::now();
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|s| s.expires_at > now)
            .count()
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        let session = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)?;

        if session.expires_at <= now {
            self.sessions
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(token);
            return Err(AuthError::Expired);
        }

        Ok(Identity {
            username: session.username,
        })
    }

    fn issue(&self, username: &str) -> IssuedToken {
        let token = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let lifetime = i64::try_from(self.credentials.token_expiry_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        let expires_at = now
            .checked_add_signed(lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(
            token.clone(),
            Session {
                username: username.to_string(),
                expires_at,
            },
        );

        IssuedToken {
            token,
            expires_in: self.credentials.token_expiry_secs,
            username: username.to_string(),
        }
    }
}

/// Pull the token from `Authorization: Bearer` or, failing that,
/// `X-API-Token`.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            headers
                .get(API_TOKEN_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|t| !t.is_empty())
        })
}

/// Auth middleware for the protected part of `/api`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let result = extract_token(req.headers())
        .ok_or(AuthError::MissingToken)
        .and_then(|token| state.sessions.verify(token));

    match result {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(
                path = %req.uri().path(),
                reason = e.label(),
                "Unauthorized API request"
            );
            Err(e)
        }
    }
}
