//! Social profile server: accounts, JWT sessions, posts feed, two-party
//! chats over PostgreSQL.

use std::net::SocketAddr;
use std::sync::Arc;

use alt_server::{api, config::ServerConfig, logging, metrics, storage::LocalDiskStorage};
use altairis::{
    auth::{AuthManager, TokenService},
    chat::ChatManager,
    db::Database,
    profile::ProfileManager,
};
use anyhow::Error;
use pico_args::Arguments;

const HELP: &str = "\
Run the Altairis social profile server

USAGE:
  alt_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:5005]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:5005)
  DATABASE_URL             PostgreSQL connection string
  ACCESS_SECRET            Access token signing secret (required)
  REFRESH_SECRET           Refresh token signing secret (required)
  PASSWORD_PEPPER          Password hashing pepper (required)
  CORS_ALLOWED_ORIGINS     Comma-separated allowed origins
  UPLOAD_DIR               Directory for uploaded images [default: uploads]
  PUBLIC_BASE_URL          Base URL for stored object links
  METRICS_BIND             Optional Prometheus scrape address
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let database_url_override: Option<String> = pargs.opt_value_from_str("--db-url")?;

    logging::init();

    let config = ServerConfig::from_env(bind_override, database_url_override)
        .map_err(|e| anyhow::anyhow!("Configuration error: {e}"))?;

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(Error::msg)?;
        tracing::info!("Metrics exporter listening on {metrics_bind}");
    }

    tracing::info!("Connecting to database");
    let db = Database::new(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {e}"))?;
    db.migrate()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {e}"))?;
    tracing::info!("Database connected and migrated");

    let pool = Arc::new(db.pool().clone());
    let tokens = Arc::new(TokenService::new(
        config.security.access_secret.clone(),
        config.security.refresh_secret.clone(),
    ));
    let auth = Arc::new(AuthManager::new(
        pool.clone(),
        config.security.password_pepper.clone(),
        tokens.clone(),
    ));
    let profiles = Arc::new(ProfileManager::new(pool.clone()));
    let chats = Arc::new(ChatManager::new(pool.clone()));

    let storage = LocalDiskStorage::new(
        config.storage.upload_dir.clone(),
        config.storage.public_base_url.clone(),
    );
    storage
        .ensure_layout()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to prepare upload directory: {e}"))?;

    let state = api::AppState {
        auth,
        profiles,
        chats,
        tokens,
        storage: Arc::new(storage),
        pool,
    };

    let app = api::create_router(state, &config.cors_allowed_origins);

    tracing::info!("Starting HTTP server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {e}", config.bind))?;

    tracing::info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {e}"))?;

    tracing::info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
}
