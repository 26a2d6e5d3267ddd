//! Route definitions and router construction.
//!
//! This module defines the HTTP routes and creates the main router.
//! Handlers delegate to the shared `AppCore` facade.

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Routes that need no token.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::api::info))
        .route("/status", get(handlers::api::status))
        .route("/auth/login", post(handlers::auth::login))
}

/// Routes behind the bearer-token middleware.
fn protected_routes() -> Router<AppState> {
    Router::new()
        // Auth API
        .route("/auth/verify", get(handlers::auth::verify))
        .route("/auth/refresh", post(handlers::auth::refresh))
        // Server API
        .route("/server/status", get(handlers::server::status))
        .route("/server/health", get(handlers::server::health))
        .route("/server/start", post(handlers::server::start))
        .route("/server/stop", post(handlers::server::stop))
        .route("/server/restart", post(handlers::server::restart))
        // Worlds API
        .route(
            "/worlds",
            get(handlers::worlds::list).post(handlers::worlds::create),
        )
        .route(
            "/worlds/{name}",
            get(handlers::worlds::get).delete(handlers::worlds::remove),
        )
        .route("/worlds/{name}/copy", post(handlers::worlds::copy))
        // Backups API
        .route(
            "/backups",
            get(handlers::backups::list).post(handlers::backups::create),
        )
        .route("/backups/cleanup", post(handlers::backups::cleanup))
        .route(
            "/backups/{filename}",
            get(handlers::backups::get).delete(handlers::backups::remove),
        )
        .route(
            "/backups/{filename}/restore",
            post(handlers::backups::restore),
        )
        // Config API
        .route(
            "/config",
            get(handlers::config::get).put(handlers::config::update),
        )
        .route("/config/runtime", get(handlers::config::runtime))
        // Logs API
        .route("/logs", get(handlers::logs::list))
        .route("/logs/search", get(handlers::logs::search))
        .route("/logs/{log_type}", get(handlers::logs::read))
        .route("/logs/{log_type}/clear", post(handlers::logs::clear))
}

/// Build all API routes without `/api` prefix (for nesting under /api).
///
/// The auth middleware is attached with `route_layer`, so it covers only the
/// protected routes; unknown paths reach the JSON 404 fallback without a
/// token.
pub(crate) fn api_routes(state: AppState) -> Router<AppState> {
    protected_routes()
        .route_layer(middleware::from_fn_with_state(state, require_auth))
        .merge(public_routes())
        .fallback(handlers::api::not_found)
}

/// Create the main Axum router with all API routes.
///
/// This creates the API routes only. For serving static assets,
/// use [`create_spa_router`] which includes both API routes and
/// static file serving with SPA fallback.
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes(Arc::clone(&state)).layer(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create a router with API routes and static asset serving.
///
/// Unmatched non-API paths fall back to `index.html` for client-side
/// routing.
pub fn create_spa_router<P: AsRef<Path>>(
    ctx: AxumContext,
    static_dir: P,
    cors_config: &CorsConfig,
) -> Router {
    let static_path = static_dir.as_ref();
    let index_path = static_path.join("index.html");

    let serve_dir = ServeDir::new(static_path).fallback(ServeFile::new(&index_path));

    create_router(ctx, cors_config).fallback_service(serve_dir)
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}
