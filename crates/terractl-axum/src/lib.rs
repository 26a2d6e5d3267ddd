//! Axum web adapter for terractl.
//!
//! Exposes the core operations over an authenticated JSON API and
//! optionally serves the web frontend. [`bootstrap`] is the composition
//! root; [`routes::create_router`] builds the router from its context.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tower as _;

// Used by main.rs binary
use clap as _;
use dotenvy as _;
use tracing_subscriber as _;

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export primary types
pub use auth::{AuthError, Identity, SessionStore};
pub use bootstrap::{AxumContext, CorsConfig, ServerConfig, bootstrap, start_server};
pub use config::{AppConfig, AuthConfig, ConfigError};
pub use error::HttpError;
pub use routes::{create_router, create_spa_router};
pub use state::AppState;
