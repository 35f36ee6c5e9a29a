//! roster-server - classroom portal back end
//!
//! Imports student rosters from uploaded spreadsheets and serves student
//! records over a JSON API.

use anyhow::{Context, Result};
use clap::Parser;
use roster_common::config::{read_toml_config, RootFolderInitializer};
use roster_common::db::init_database;
use roster_server::config::{Cli, ServerConfig, MODULE_NAME};
use roster_server::{build_router, AppState};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (toml, toml_problem) = read_toml_config(MODULE_NAME);
    let config = ServerConfig::resolve_with(&cli, &toml);

    init_tracing(&config)?;

    // Build identification first, before any slow startup work
    info!(
        "Starting roster-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if let Some(problem) = toml_problem {
        warn!("{} (using compiled defaults)", problem);
    }

    let initializer = RootFolderInitializer::new(config.root_folder.clone());
    initializer
        .ensure_directory_exists()
        .with_context(|| format!("Failed to initialize root folder {}", config.root_folder.display()))?;
    info!("Root folder: {}", initializer.root_folder().display());

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .context("Failed to open database")?;

    if cli.init_db {
        info!("✓ Database schema initialized");
        pool.close().await;
        return Ok(());
    }

    let state = AppState::new(pool, initializer.uploads_dir(), config.max_upload_bytes)
        .with_cors_origins(config.cors_origins.clone());
    let app = build_router(state);

    let address = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("roster-server listening on http://{}", address);
    info!("Health check: http://{}/api/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("roster-server stopped");
    Ok(())
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(config: &ServerConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
