//! `roadwatchd` — the road condition monitoring server.
//!
//! Usage:
//!   roadwatchd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/roadwatch/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod login;
mod routes;

use std::sync::Arc;

use clap::Parser;
use roadwatch_core::Module;
use tracing::info;

use config::ServerConfig;
use routes::AppState;

/// Road condition monitoring server.
#[derive(Parser, Debug)]
#[command(name = "roadwatchd", about = "Road condition monitoring server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides the configured one).
    #[arg(long = "listen")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    // Verify configuration is valid.
    bootstrap::verify_config(&server_config)?;

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let sql: Arc<dyn roadwatch_sql::SQLStore> = Arc::new(
        roadwatch_sql::SqliteStore::open(&server_config.sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    let telemetry_module = roadwatch_telemetry::TelemetryModule::new(Arc::clone(&sql))?;
    info!("Telemetry module initialized");

    let module_routes = vec![(telemetry_module.name(), telemetry_module.routes())];

    // Build application state and router.
    let listen = cli
        .listen
        .unwrap_or_else(|| server_config.server.listen.clone());
    let app_state = AppState {
        server_config: Arc::new(server_config),
    };
    let app = routes::build_router(app_state, module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!("roadwatchd listening on {}", listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl_c");
    info!("Shutdown signal received");
}
