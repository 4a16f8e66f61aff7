//! `opentodod` — the OpenTodo server binary.
//!
//! Usage:
//!   opentodod -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/opentodo/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use opentodo_core::Module;
use tracing::info;

use config::ServerConfig;

/// OpenTodo server.
#[derive(Parser, Debug)]
#[command(name = "opentodod", about = "OpenTodo server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides the configured default).
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

    let listen = cli
        .listen
        .unwrap_or_else(|| server_config.server.listen.clone());

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let sql: Arc<dyn opentodo_sql::SQLStore> = Arc::new(
        opentodo_sql::SqliteStore::open(&data_dir.join("data.sqlite"))
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    // Initialize modules.
    let auth_config = auth::service::AuthConfig {
        jwt_secret: server_config.jwt.secret.clone(),
        access_token_ttl: server_config.jwt.access_ttl_secs,
        refresh_token_ttl: server_config.jwt.refresh_ttl_secs,
        providers: server_config.oauth.providers.clone(),
    };
    let auth_module = auth::AuthModule::new(Arc::clone(&sql), auth_config)?;
    info!("Auth module initialized");

    let task_module = task::TaskModule::new(Arc::clone(&sql))?;
    info!("Task module initialized");

    let auth_service = auth_module.service().clone();
    let module_routes = vec![
        (auth_module.name(), auth_module.routes()),
        (task_module.name(), task_module.routes()),
    ];

    // Build router.
    let app = routes::build_router(auth_service, module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!("OpenTodo server listening on {}", listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
