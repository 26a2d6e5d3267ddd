//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the Axum web adapter. All concrete implementations are instantiated here.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use terractl_core::ports::{ArchiveLister, CommandRunner, DiskProbe, StateProbe};
use terractl_core::{AppCore, CorePorts};
use terractl_runtime::{ScriptRunner, StatvfsDiskProbe, SupervisorProbe, TarArchiveLister};

use crate::auth::SessionStore;
use crate::config::AppConfig;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (`CORS_ORIGINS=*`).
    #[default]
    AllowAll,
    /// Allow specific origins.
    AllowOrigins(Vec<String>),
}

impl CorsConfig {
    /// Parse `*` or a comma-separated origin list.
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            Self::AllowAll
        } else {
            Self::AllowOrigins(origins)
        }
    }
}

/// Listener configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Optional path to static assets for SPA serving.
    pub static_dir: Option<PathBuf>,
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Set the static directory for SPA serving.
    #[must_use]
    pub fn with_static_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(path.into());
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Application context for the Axum adapter.
pub struct AxumContext {
    /// The core application facade.
    pub core: Arc<AppCore>,
    /// Bearer-token sessions.
    pub sessions: SessionStore,
}

/// Wire the OS adapters into an [`AppCore`] and build the context.
///
/// Fails when the configuration does not validate.
pub fn bootstrap(config: &AppConfig) -> Result<AxumContext> {
    config.ensure_valid()?;

    let layout = &config.layout;
    tracing::info!(
        target: "terractl.paths",
        worlds = %layout.dirs.worlds.display(),
        backups = %layout.dirs.backups.display(),
        logs = %layout.dirs.logs.display(),
        scripts = %layout.dirs.scripts.display(),
        config = %layout.dirs.config.display(),
        supervisor_socket = %layout.supervisor.socket.display(),
        program = %layout.supervisor.program,
        "Axum bootstrap resolved paths"
    );
    for dir in [&layout.dirs.worlds, &layout.dirs.backups, &layout.dirs.logs] {
        if !dir.is_dir() {
            tracing::warn!(path = %dir.display(), "Directory does not exist yet");
        }
    }

    let runner: Arc<dyn CommandRunner> = Arc::new(ScriptRunner::new());
    let probe: Arc<dyn StateProbe> = Arc::new(SupervisorProbe::new(
        layout.supervisor.clone(),
        Arc::clone(&runner),
    ));
    let disk: Arc<dyn DiskProbe> = Arc::new(StatvfsDiskProbe);
    let archives: Arc<dyn ArchiveLister> = Arc::new(TarArchiveLister);

    let core = Arc::new(AppCore::new(
        layout.clone(),
        config.settings.clone(),
        CorePorts {
            runner,
            probe,
            disk,
            archives,
        },
    ));

    Ok(AxumContext {
        core,
        sessions: SessionStore::new(config.auth.clone()),
    })
}

/// Start the web server.
///
/// If `config.server.static_dir` is set, serves static assets with SPA
/// fallback. Otherwise, serves only the API endpoints.
pub async fn start_server(config: AppConfig) -> Result<()> {
    use tokio::net::TcpListener;
    use tracing::info;

    let ctx = bootstrap(&config)?;
    let server = &config.server;

    let app = if let Some(ref static_dir) = server.static_dir {
        info!("Serving static assets from: {}", static_dir.display());
        crate::routes::create_spa_router(ctx, static_dir, &server.cors)
    } else {
        crate::routes::create_router(ctx, &server.cors)
    };

    let addr = server.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(
        username = %config.auth.username,
        token_expiry_secs = config.auth.token_expiry_secs,
        "terractl API listening on http://{}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("terractl API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
