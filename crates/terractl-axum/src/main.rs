//! `terractl-server`: the terractl HTTP API.

use std::path::PathBuf;

use clap::Parser;
use terractl_axum::{AppConfig, start_server};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "terractl-server", version, about = "Remote control API for a Terraria server")]
struct Cli {
    /// Address to bind (overrides API_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides API_PORT)
    #[arg(long, short)]
    port: Option<u16>,

    /// Serve the web frontend from this directory (overrides FRONTEND_DIR)
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();

    let default_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(dir) = cli.static_dir {
        config.server = config.server.with_static_dir(dir);
    }

    for problem in config.validate() {
        tracing::error!("Configuration error: {problem}");
    }

    start_server(config).await
}
